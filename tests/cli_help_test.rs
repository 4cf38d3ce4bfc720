#[cfg(test)]
mod cli_help_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;

    fn nimbus() -> Command {
        let mut cmd = Command::cargo_bin("nimbus").unwrap();
        for (key, _) in std::env::vars() {
            if key.starts_with("NIMBUS_") {
                cmd.env_remove(key);
            }
        }
        cmd.env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn test_cli_help_output() {
        let assert_result = nimbus().arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Commands:"));

        // Every service group is listed
        for group in ["dns", "redis", "public-ip", "service-account", "config"] {
            assert!(help_output.contains(group), "missing {group}");
        }

        assert!(help_output.contains("-h, --help"));
        assert!(help_output.contains("-V, --version"));
        assert!(help_output.contains("--project-id"));
    }

    #[test]
    fn test_cli_subcommand_help_outputs() {
        let subcommands = [
            (vec!["dns", "zone"], vec!["list", "create", "describe", "update", "delete"]),
            (vec!["redis"], vec!["plans", "instance"]),
            (vec!["redis", "instance"], vec!["list", "create", "update", "delete"]),
            (
                vec!["public-ip"],
                vec!["create", "list", "describe", "update", "associate", "disassociate", "delete"],
            ),
            (vec!["service-account", "key"], vec!["create", "list", "describe", "delete"]),
            (vec!["config"], vec!["list", "set", "unset"]),
        ];

        for (path, children) in subcommands {
            let assert_result = nimbus().args(&path).arg("--help").assert().success();
            let output = assert_result.get_output();
            let help_output = String::from_utf8_lossy(&output.stdout);

            assert!(help_output.contains(&format!("Usage: nimbus {}", path.join(" "))));
            for child in children {
                assert!(help_output.contains(child), "{path:?} is missing {child}");
            }
        }
    }

    #[test]
    fn test_leaf_help_shows_examples_and_required_flags() {
        nimbus()
            .args(["dns", "zone", "create", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Examples:"))
            .stdout(predicate::str::contains("$ nimbus dns zone create --name my-zone"))
            .stdout(predicate::str::contains("(required)"));
    }

    #[test]
    fn test_group_without_subcommand_prints_help() {
        nimbus()
            .arg("dns")
            .assert()
            .success()
            .stdout(predicate::str::contains("zone"));
    }

    #[test]
    fn test_version_flag() {
        nimbus()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
