use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors raised while talking to the JVM
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A class or method the native side expects is missing on the managed side
    #[error("Cannot resolve {what}: {source}")]
    Resolve {
        what: String,
        #[source]
        source: jni::errors::Error,
    },

    /// Exported function called before `JNI_OnLoad` completed or after `JNI_OnUnload`
    #[error("Bridge is not initialised")]
    NotInitialised,

    /// Any other JNI failure while marshalling values
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),
}

impl BridgeError {
    pub fn resolve(what: impl Into<String>, source: jni::errors::Error) -> Self {
        Self::Resolve {
            what: what.into(),
            source,
        }
    }

    /// Whether a Java exception is already pending for this failure
    pub fn is_java_exception(&self) -> bool {
        matches!(
            self,
            Self::Jni(jni::errors::Error::JavaException)
                | Self::Resolve {
                    source: jni::errors::Error::JavaException,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_names_the_missing_item() {
        let err = BridgeError::resolve(
            "com/simplecityapps/ktaglib/Metadata",
            jni::errors::Error::NullPtr("find_class"),
        );
        assert!(err
            .to_string()
            .starts_with("Cannot resolve com/simplecityapps/ktaglib/Metadata"));
        assert!(!err.is_java_exception());
    }

    #[test]
    fn pending_exception_detection() {
        assert!(BridgeError::Jni(jni::errors::Error::JavaException).is_java_exception());
        assert!(!BridgeError::NotInitialised.is_java_exception());
    }
}
