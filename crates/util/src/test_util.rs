//! Test-only assertion macros, exported for use from other crates' tests.

/// Assert that `$result` is an `Err` whose message (via `anyhow`'s error
/// chain) contains `$substring`.
#[macro_export]
macro_rules! assert_err {
    ($result:expr, $substring:expr) => {{
        let error: anyhow::Error = match $result {
            Ok(_) => panic!("expected Err, got Ok"),
            Err(error) => error.into(),
        };
        let message = error.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ");
        assert!(
            message.contains($substring),
            "expected error message to contain `{}`, got `{message}`",
            $substring
        );
    }};
}

/// Assert that `$value` matches `$pattern`, optionally with a trailing
/// guard (`if ...`), returning the bound value for further assertions.
#[macro_export]
macro_rules! assert_matches {
    ($value:expr, $pattern:pat $(if $guard:expr)? $(=> $out:expr)?) => {{
        match $value {
            $pattern $(if $guard)? => { $($out)? }
            other => panic!("expected value to match `{}`, got `{other:?}`", stringify!($pattern)),
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_err_matches_substring() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("boom: disk full"));
        assert_err!(result, "disk full");
    }

    #[test]
    #[should_panic(expected = "expected Err, got Ok")]
    fn test_assert_err_panics_on_ok() {
        let result: anyhow::Result<()> = Ok(());
        assert_err!(result, "anything");
    }

    #[test]
    fn test_assert_matches_binds_output() {
        let value = Some(5);
        let n = assert_matches!(value, Some(n) if n > 0 => n);
        assert_eq!(n, 5);
    }
}
