use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

#[allow(dead_code)]
mod quickprop_demo_bin {
    include!("../quickprop_demo.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;

        #[test]
        fn test_config_from_args_without_path() {
            let args = vec!["quickprop_demo".to_string()];
            let config = config_from_args(&args).unwrap();
            assert!(config.debug);
            assert_eq!(config.patience, 20_000);
        }

        #[test]
        fn test_config_from_args_with_path() {
            let temp = crate::write_temp_config(r#"{ "patience": 300, "learning_rate": 0.001 }"#);
            let args = vec![
                "quickprop_demo".to_string(),
                temp.path().to_str().unwrap().to_string(),
            ];
            let config = config_from_args(&args).unwrap();
            assert_eq!(config.patience, 300);
            assert_eq!(config.learning_rate, 0.001);
            assert!(!config.debug);
        }

        #[test]
        fn test_config_from_args_bad_path() {
            let args = vec![
                "quickprop_demo".to_string(),
                "missing_demo_config.json".to_string(),
            ];
            assert!(config_from_args(&args).is_err());
        }

        #[test]
        fn test_train_respects_patience() {
            let config = QuickpropConfig::default().with_patience(50);
            let outcome = train(&config).unwrap();

            assert!(outcome.iterations <= 50);
            assert_eq!(outcome.parameters.len(), NUM_FEATURES);
            assert_eq!(outcome.prediction.len(), NUM_SAMPLES);
            report(&outcome);
        }

        #[test]
        fn test_train_learns_or() {
            let outcome = train(&QuickpropConfig::default()).unwrap();
            assert!(outcome.prediction[0] < 0.1);
            assert!(outcome.prediction[3] > 0.9);
        }
    }
}
