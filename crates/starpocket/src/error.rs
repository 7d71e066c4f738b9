use std::{error, fmt};

/// Displays an error followed by all of its `source()` causes, joined with
/// `": "`.
pub struct ErrorChain<'e>(pub &'e (dyn error::Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)?;

        let mut cause = self.0.source();
        while let Some(err) = cause {
            write!(f, ": {err}")?;
            cause = err.source();
        }

        Ok(())
    }
}

pub trait FmtChain {
    fn fmt_chain(&self) -> ErrorChain<'_>;
}

impl<E> FmtChain for E
where
    E: error::Error + 'static,
{
    fn fmt_chain(&self) -> ErrorChain<'_> {
        ErrorChain(self)
    }
}
