//! Ledger commands: log, verify, export, report, retention

use crate::output::{print_json, print_status};
use crate::Context;
use audit_ledger::{AuditQuery, EventCategory, EventFields, ExportFormat, Severity};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct LogArgs {
    /// Event category (auth, access, data, computation, security, compliance, user_activity, system)
    #[arg(long)]
    pub category: EventCategory,

    /// Event type
    #[arg(long = "type")]
    pub event_type: String,

    #[arg(long)]
    pub action: Option<String>,

    #[arg(long)]
    pub resource: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub session: Option<String>,

    #[arg(long, default_value = "info")]
    pub severity: Severity,
}

/// Filters shared by read commands
#[derive(Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub category: Option<EventCategory>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub session: Option<String>,

    #[arg(long = "type")]
    pub event_type: Option<String>,
}

impl FilterArgs {
    fn query(self) -> AuditQuery {
        AuditQuery {
            category: self.category,
            user_id: self.user,
            session_id: self.session,
            event_type: self.event_type,
            ..Default::default()
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// json or csv
    #[arg(short, long, default_value = "json")]
    pub format: ExportFormat,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn log(ctx: &Context, args: LogArgs) -> anyhow::Result<()> {
    let mut fields = EventFields::new(args.event_type)
        .severity(args.severity)
        .maybe_user(args.user)
        .maybe_session(args.session);
    if let Some(action) = args.action {
        fields = fields.action(action);
    }
    if let Some(resource) = args.resource {
        fields = fields.resource(resource);
    }

    let event = ctx.ledger.append(args.category, fields).await?;
    print_json(&event)
}

/// Print the verification report; returns whether the chain verified.
pub fn verify(ctx: &Context) -> anyhow::Result<bool> {
    let report = ctx.ledger.verify()?;
    print_json(&report)?;

    let summary = match report.message {
        Some(ref message) => message.clone(),
        None if report.verified => format!("{} events verified", report.total_events),
        None => format!(
            "{} integrity errors in {} events",
            report.errors.len(),
            report.total_events
        ),
    };
    print_status(report.verified, &summary);
    Ok(report.verified)
}

pub fn export(ctx: &Context, args: ExportArgs) -> anyhow::Result<()> {
    let output = ctx.ledger.export(args.format, &args.filter.query())?;
    println!("{output}");
    Ok(())
}

pub fn report(ctx: &Context, args: FilterArgs) -> anyhow::Result<()> {
    print_json(&ctx.ledger.analytics_report(&args.query()))
}

pub async fn retention(ctx: &Context) -> anyhow::Result<()> {
    let removed = ctx.ledger.enforce_retention_policy().await?;
    info!(removed, retention_days = ctx.config.ledger.retention_days, "retention run complete");
    print_status(
        true,
        &format!(
            "removed {removed} events older than {} days",
            ctx.config.ledger.retention_days
        ),
    );
    Ok(())
}
