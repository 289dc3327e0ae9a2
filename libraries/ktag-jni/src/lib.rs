//! ktaglib - native half of `com.simplecityapps.ktaglib.KTagLib`
//!
//! Exposes metadata reading, artwork extraction and the (unsupported) write
//! entry point over JNI. The host passes open file descriptors; the library
//! duplicates them for parsing and never closes the caller's descriptor.
//!
//! Lifecycle:
//!
//! - `JNI_OnLoad` attaches the diagnostic sink and resolves every managed
//!   class and method once
//! - the exported functions share that state across threads
//! - `JNI_OnUnload` releases the handles and detaches the sink
//!
//! Absence (unreadable descriptor, unrecognised format, no pictures) is
//! reported as `null`/`false`. Only JNI failures surface as Java exceptions.

mod bridge;
pub mod diagnostics;
mod error;
pub mod marshal;
pub mod registry;

pub use bridge::BridgeContext;
pub use diagnostics::DiagnosticsConfig;
pub use error::{BridgeError, Result};

use jni::objects::JObject;
use jni::sys::{jboolean, jbyteArray, jint, jobject, JNI_ERR, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use std::ffi::c_void;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

static CONTEXT: RwLock<Option<Arc<BridgeContext>>> = RwLock::new(None);

fn context() -> Result<Arc<BridgeContext>> {
    CONTEXT
        .read()
        .ok()
        .and_then(|slot| slot.clone())
        .ok_or(BridgeError::NotInitialised)
}

/// Install the shared context, replacing any previous one
pub fn install(context: BridgeContext) -> bool {
    match CONTEXT.write() {
        Ok(mut slot) => {
            *slot = Some(Arc::new(context));
            true
        }
        Err(_) => false,
    }
}

/// Drop the shared context and detach diagnostics
///
/// Calls already holding the context finish with it; later calls see
/// [`BridgeError::NotInitialised`].
pub fn shutdown() {
    if let Ok(mut slot) = CONTEXT.write() {
        slot.take();
    }
    diagnostics::detach();
}

/// Raise `err` as a Java exception unless one is already pending
fn throw(env: &mut JNIEnv<'_>, err: &BridgeError) {
    error!("{}", err);

    if err.is_java_exception() || env.exception_check().unwrap_or(false) {
        return;
    }

    let class = match err {
        BridgeError::NotInitialised => "java/lang/IllegalStateException",
        _ => "java/lang/RuntimeException",
    };
    if let Err(e) = env.throw_new(class, err.to_string()) {
        error!("Failed to raise {}: {}", class, e);
    }
}

#[no_mangle]
#[allow(unsafe_code)]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    diagnostics::attach(&DiagnosticsConfig::default());

    let mut env = match vm.get_env() {
        Ok(env) => env,
        Err(e) => {
            error!("No JNI environment on the loading thread: {}", e);
            return JNI_ERR;
        }
    };

    match BridgeContext::initialize(&mut env) {
        Ok(context) => {
            if !install(context) {
                error!("Bridge context lock is poisoned");
                return JNI_ERR;
            }
            info!("ktaglib loaded");
            JNI_VERSION_1_6
        }
        Err(e) => {
            error!("Failed to initialise bridge: {}", e);
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_describe();
                let _ = env.exception_clear();
            }
            JNI_ERR
        }
    }
}

#[no_mangle]
#[allow(unsafe_code)]
pub extern "system" fn JNI_OnUnload(_vm: JavaVM, _reserved: *mut c_void) {
    info!("ktaglib unloading");
    shutdown();
}

#[no_mangle]
#[allow(unsafe_code)]
pub extern "system" fn Java_com_simplecityapps_ktaglib_KTagLib_getMetadata<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    file_descriptor: jint,
) -> jobject {
    match context().and_then(|ctx| ctx.get_metadata(&mut env, file_descriptor)) {
        Ok(metadata) => metadata.into_raw(),
        Err(e) => {
            throw(&mut env, &e);
            JObject::null().into_raw()
        }
    }
}

#[no_mangle]
#[allow(unsafe_code)]
pub extern "system" fn Java_com_simplecityapps_ktaglib_KTagLib_writeMetadata<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    file_descriptor: jint,
    properties: JObject<'local>,
) -> jboolean {
    match context().and_then(|ctx| ctx.write_metadata(&mut env, file_descriptor, &properties)) {
        Ok(true) => JNI_TRUE,
        Ok(false) => JNI_FALSE,
        Err(e) => {
            throw(&mut env, &e);
            JNI_FALSE
        }
    }
}

#[no_mangle]
#[allow(unsafe_code)]
pub extern "system" fn Java_com_simplecityapps_ktaglib_KTagLib_getArtwork<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    file_descriptor: jint,
) -> jbyteArray {
    match context().and_then(|ctx| ctx.get_artwork(&mut env, file_descriptor)) {
        Ok(artwork) => artwork.into_raw(),
        Err(e) => {
            throw(&mut env, &e);
            JObject::null().into_raw()
        }
    }
}
