//! Runtime helpers for the CLI entrypoints.

use std::process::ExitCode;

/// Converts a child's exit code into this process's exit code.
///
/// Codes outside `0..=255` cannot be represented and become a failure.
pub(crate) fn exit_code_from_status(status: i32) -> ExitCode {
    u8::try_from(status).map_or(ExitCode::FAILURE, ExitCode::from)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, ExitCode::SUCCESS)]
    #[case(1, ExitCode::FAILURE)]
    #[case(137, ExitCode::from(137))]
    #[case(255, ExitCode::from(255))]
    #[case(256, ExitCode::FAILURE)]
    #[case(-1, ExitCode::FAILURE)]
    fn maps_status_to_exit_code(#[case] status: i32, #[case] expected: ExitCode) {
        assert_eq!(exit_code_from_status(status), expected);
    }
}
