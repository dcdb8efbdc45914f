//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::Jail;
use pretty_assertions::assert_eq;
use prism_config::PrismConfig;
use std::path::{Path, PathBuf};

#[test]
fn loads_sections_from_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".prism")?;
        jail.create_file(
            ".prism/config.toml",
            r#"
[tenant]
tenant_id = "contoso"
client_id = "app"
client_secret = "secret"
timeout_secs = 30

[crawler]
operator_upn = "ops@contoso.com"
connection_filter = "dw-prod"

[output]
dir = "audit-out"
"#,
        )?;

        let config = PrismConfig::load(None).expect("config loads");
        assert_eq!(config.tenant.tenant_id, "contoso");
        assert_eq!(config.tenant.timeout_secs, 30);
        assert!(config.tenant.has_client_credentials());
        assert_eq!(config.crawler.operator_upn, "ops@contoso.com");
        assert_eq!(config.crawler.connection_filter, "dw-prod");
        assert!(config.crawler.include_nulls);
        assert_eq!(config.output.dir, PathBuf::from("audit-out"));
        assert_eq!(config.output.partitions_csv, "partitions.csv");
        Ok(())
    });
}

#[test]
fn explicit_file_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".prism")?;
        jail.create_file(
            ".prism/config.toml",
            "[crawler]\nconnection_filter = \"from-project\"\n",
        )?;
        jail.create_file("run.toml", "[crawler]\nconnection_filter = \"from-run\"\n")?;

        let config = PrismConfig::load(Some(Path::new("run.toml"))).expect("config loads");
        assert_eq!(config.crawler.connection_filter, "from-run");
        Ok(())
    });
}

#[test]
fn malformed_toml_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[tenant\ntimeout_secs = 1\n")?;
        assert!(PrismConfig::load(Some(Path::new("bad.toml"))).is_err());
        Ok(())
    });
}
