use comparcar_db::{connect_with_settings, migrations, DemoCatalog, VerificationResult};

use crate::commands::{
    build_runtime, load_config, CommandResult, Failure, EXIT_DB_CONNECT, EXIT_MIGRATION,
    EXIT_VERIFICATION,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("seed") {
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

        let run_result: Result<String, Failure> = async {
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

            let seeded = DemoCatalog::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

            if seeded.skipped {
                return Ok("cars table already holds rows; demo catalog skipped".to_string());
            }

            let verification = DemoCatalog::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;
            if !verification.all_present {
                let message = verification_message(&verification);
                return Err(("seed_verification", message, EXIT_VERIFICATION));
            }

            Ok(format!(
                "demo catalog loaded: {} of {} cars inserted and verified",
                seeded.inserted,
                DemoCatalog::expected_count()
            ))
        }
        .await;

        pool.close().await;
        run_result
    });

    match result {
        Ok(message) => CommandResult::success("seed", message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_message(verification: &VerificationResult) -> String {
    let missing = verification
        .checks
        .iter()
        .filter_map(|(model, present)| (!present).then_some(*model))
        .collect::<Vec<_>>();

    if missing.is_empty() {
        "some demo cars failed to load".to_string()
    } else {
        format!("demo catalog verification failed for: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use comparcar_db::VerificationResult;

    use super::verification_message;

    #[test]
    fn verification_message_names_missing_models() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![("Skoda Octavia", true), ("Tesla Model 3", false), ("Fiat 500", false)],
        };

        assert_eq!(
            verification_message(&verification),
            "demo catalog verification failed for: Tesla Model 3, Fiat 500"
        );
    }

    #[test]
    fn verification_message_falls_back_without_labels() {
        let verification = VerificationResult { all_present: false, checks: Vec::new() };

        assert_eq!(verification_message(&verification), "some demo cars failed to load");
    }
}
