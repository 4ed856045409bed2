use comparcar_db::{connect_with_settings, migrations};

use crate::commands::{
    build_runtime, load_config, CommandResult, Failure, EXIT_DB_CONNECT, EXIT_MIGRATION,
};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECT))?;

        let outcome = migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION));
        let applied: Result<i64, Failure> = match outcome {
            Ok(()) => migrations::applied_count(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION)),
            Err(failure) => Err(failure),
        };

        pool.close().await;
        applied
    });

    match result {
        Ok(applied) => CommandResult::success(
            "migrate",
            format!("applied pending migrations ({applied} recorded)"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
