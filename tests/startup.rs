use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ingest-pipeline"));
    for var in [
        "SNOWFLAKE_ACCOUNT",
        "SNOWFLAKE_USER",
        "SNOWFLAKE_PASSWORD",
        "SNOWFLAKE_ROLE",
        "SNOWFLAKE_WAREHOUSE",
        "SNOWFLAKE_DATABASE",
        "SNOWFLAKE_RAW_SCHEMA",
        "LOCAL_DATA_PATH",
        "INGEST_CHUNK_SIZE",
        "INGEST_SCHEMA_POLICY",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn missing_config_exits_nonzero_naming_each_variable() {
    let work = tempdir().unwrap();
    let data = work.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("plays.csv"), "a,b\n1,x\n").unwrap();

    let output = binary()
        .current_dir(work.path())
        .env("SNOWFLAKE_ACCOUNT", "xy12345")
        .env("SNOWFLAKE_PASSWORD", "hunter2")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "missing required environment variables: SNOWFLAKE_USER, LOCAL_DATA_PATH"
    ));
    assert!(!stderr.contains("SNOWFLAKE_ACCOUNT"));
    assert!(!data.join("parquet").exists());
}

#[test]
fn env_file_fills_in_settings_and_converts_directory() {
    let work = tempdir().unwrap();
    let data = work.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("plays.csv"), "a,b\n1, x \n1, x \n2,y\n").unwrap();
    fs::write(
        work.path().join(".env"),
        format!(
            "SNOWFLAKE_ACCOUNT=xy12345\nSNOWFLAKE_USER=loader\nSNOWFLAKE_PASSWORD=hunter2\nLOCAL_DATA_PATH={}\n",
            data.display()
        ),
    )
    .unwrap();

    let output = binary().current_dir(work.path()).output().unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(data.join("parquet").join("plays.parquet").is_file());
    let report: serde_json::Value =
        serde_json::from_slice(output.stdout.split(|b| *b == b'\n').next().unwrap()).unwrap();
    assert_eq!(report["rows_written"], 2);
    assert_eq!(report["duplicates_removed"], 1);
    assert_eq!(report["delimiter"], "comma");
}
