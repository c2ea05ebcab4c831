//! Attestation command

use crate::output::print_json;
use crate::Context;
use anyhow::Context as _;
use std::path::Path;
use std::sync::Arc;
use zkp_verification::{AttestationCoordinator, ComputationDescriptor};

pub async fn execute(ctx: &Context, input: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let descriptor = parse_descriptor(&raw)?;

    let coordinator = AttestationCoordinator::new(Arc::clone(&ctx.ledger), ctx.config.zkp.clone());
    let attestation = coordinator.attest(descriptor).await?;
    print_json(&attestation)
}

fn parse_descriptor(raw: &str) -> anyhow::Result<ComputationDescriptor> {
    let descriptor: ComputationDescriptor =
        serde_json::from_str(raw).context("computation descriptor is not valid JSON")?;
    if descriptor.function.is_empty() {
        anyhow::bail!("computation descriptor needs a `function` name");
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use audit_ledger::AuditQuery;

    #[test]
    fn test_parse_descriptor() {
        let descriptor = parse_descriptor(
            r#"{
                "inputData": {"p": 250},
                "outputData": {"status": "stable", "rSquared": 0.42},
                "function": "pressure_trend",
                "type": "regression"
            }"#,
        )
        .unwrap();
        assert_eq!(descriptor.function, "pressure_trend");
        assert_eq!(descriptor.computation_type.as_deref(), Some("regression"));
        assert_eq!(descriptor.output_data["rSquared"], 0.42);
    }

    #[tokio::test]
    async fn test_execute_attests_descriptor_file() {
        let (ctx, _) = testing::context();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("computation.json");
        std::fs::write(
            &path,
            r#"{"inputData": {"p": 250}, "outputData": {"trend": 1.5}, "function": "fit", "sessionId": "s-9"}"#,
        )
        .unwrap();

        execute(&ctx, &path).await.unwrap();

        let attested = ctx
            .ledger
            .query(&AuditQuery::builder().event_type("zkp_attestation_generated").build());
        assert_eq!(attested.len(), 1);
        assert_eq!(attested[0].metadata["verified"], true);
        assert_eq!(attested[0].session_id.as_deref(), Some("s-9"));
        assert!(ctx.ledger.verify().unwrap().verified);
    }

    #[tokio::test]
    async fn test_execute_reports_missing_file() {
        let (ctx, _) = testing::context();
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(execute(&ctx, &temp_dir.path().join("absent.json")).await.is_err());
        assert!(ctx.ledger.is_empty());
    }

    #[test]
    fn test_descriptor_requires_function() {
        assert!(parse_descriptor(r#"{"inputData": 1}"#).is_err());
        assert!(parse_descriptor("not json").is_err());
    }
}
