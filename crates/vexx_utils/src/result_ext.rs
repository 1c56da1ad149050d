use crate::AnyResult;
use anyhow::{anyhow, Context};
use std::fmt::Display;

/// Attaches a human readable context to errors coming out of library code. The message is only
/// built on failure.
pub trait AnyhowResultExt<T> {
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T>;
}

impl<T, E> AnyhowResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T> {
        self.with_context(|| f().to_string())
    }
}

impl<T> AnyhowResultExt<T> for Option<T> {
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T> {
        self.ok_or_else(|| anyhow!("{}", f()))
    }
}

#[cfg(test)]
mod tests {
    use super::AnyhowResultExt;

    #[test]
    fn wraps_errors_and_options() {
        let parsed: Result<u32, _> = "12x".parse::<u32>();
        let err = parsed.otherwise_with(|| "couldn't parse the count").unwrap_err();
        assert_eq!(err.to_string(), "couldn't parse the count");
        assert_eq!(err.chain().count(), 2);

        let err = None::<u8>.otherwise_with(|| format!("node #{}", 3)).unwrap_err();
        assert_eq!(err.to_string(), "node #3");
    }

    #[test]
    fn messages_are_only_built_on_failure() {
        let ok: Result<u8, std::fmt::Error> = Ok(1);
        assert_eq!(ok.otherwise_with(|| -> String { panic!("built") }).unwrap(), 1);
        assert_eq!(Some(5).otherwise_with(|| -> String { panic!("built") }).unwrap(), 5);
    }
}
