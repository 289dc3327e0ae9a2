use ktag_core::PictureCandidate;

/// How one picture is chosen among all embedded candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Strictly largest payload. Among equally large pictures the first one wins.
    #[default]
    Largest,

    /// Running comparison against the previous candidate only.
    ///
    /// Each candidate is compared with the size of the candidate enumerated
    /// just before it, not with the best one so far, so a later picture can
    /// win after a smaller one even if an earlier picture was larger.
    Legacy,
}

impl SelectionPolicy {
    /// Pick one candidate, or `None` if there is nothing to pick from
    pub fn select<'c, 'a>(
        self,
        candidates: &'c [PictureCandidate<'a>],
    ) -> Option<&'c PictureCandidate<'a>> {
        match self {
            Self::Largest => candidates.iter().fold(None, |best, candidate| match best {
                Some(best) if candidate.len() <= best.len() => Some(best),
                _ => Some(candidate),
            }),
            Self::Legacy => {
                let mut selected = None;
                let mut previous_size = 0;
                for candidate in candidates {
                    if candidate.len() > previous_size {
                        selected = Some(candidate);
                    }
                    previous_size = candidate.len();
                }
                selected
            }
        }
    }
}
