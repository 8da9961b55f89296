//! Process exit codes. Part of the CI contract: workflows may branch on them.

use qualitymax_client::ExecutionError;

pub const SUCCESS: i32 = 0;
pub const TESTS_FAILED: i32 = 1; // Run completed with a failed result
pub const CONFIG_ERROR: i32 = 2; // Bad inputs, invalid key, unresolvable project
pub const EXECUTION_ERROR: i32 = 3; // Service refused or lost the execution
pub const TIMEOUT: i32 = 4; // Wall-clock budget exhausted
pub const SERVICE_ERROR: i32 = 5; // Status/results/transport failure

/// Exit code for a terminal error; client errors keep their own mapping.
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ExecutionError>())
        .map(ExecutionError::exit_code)
        .unwrap_or(CONFIG_ERROR)
}
