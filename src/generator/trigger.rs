use std::time::Instant;

use thiserror::Error;

use super::Generator;
use crate::logger;

/// A generation attempt that failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0:#}")]
    Generate(anyhow::Error),
}

/// Runs the generator on the caller's thread and reports the outcome.
pub struct BuildTrigger {
    generator: Box<dyn Generator>,
}

impl BuildTrigger {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Run one full generation.
    pub fn build(&mut self) -> Result<(), BuildError> {
        self.generator.generate().map_err(BuildError::Generate)
    }

    /// Rebuild from inside the loop.
    ///
    /// Failure is reported as recoverable and swallowed; the loop goes on.
    /// Returns whether the rebuild succeeded.
    pub fn rebuild(&mut self) -> bool {
        logger::status_progress("regenerating...");
        let started = Instant::now();

        match self.build() {
            Ok(()) => {
                logger::status_success(started.elapsed());
                true
            }
            Err(e) => {
                crate::error!("Regeneration failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGenerator;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_build_success() {
        let (generator, calls) = FakeGenerator::new(false);
        let mut trigger = BuildTrigger::new(generator);
        assert!(trigger.build().is_ok());
        assert!(trigger.rebuild());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_failure_is_reported() {
        let (generator, calls) = FakeGenerator::new(true);
        let mut trigger = BuildTrigger::new(generator);

        let err = trigger.build().unwrap_err();
        assert!(err.to_string().contains("expected expression"));

        // recoverable: reported, next rebuild still runs
        assert!(!trigger.rebuild());
        assert!(!trigger.rebuild());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
