//! CLI command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use moodtrack_core::models::ServerReply;
use moodtrack_core::stats::MoodStats;
use moodtrack_core::{AppContext, Config, MoodTracker};
use tracing::debug;

use crate::cli::MoodAction;
use crate::output::{info, print_moods, print_patient_moods, print_patient_table, print_stats, success};

pub async fn login(ctx: &AppContext, config: &Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;

    let user = ctx.sign_in(&email, &password).await?;

    // Reload so command-line overrides are not written back
    let mut saved = Config::load().unwrap_or_default();
    saved.last_email = Some(email);
    if let Err(e) = saved.save() {
        debug!(error = %e, "Failed to save config");
    }

    success(&format!("Signed in as {}", user.display_name()));
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.sign_out()?;
    success("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.require_signed_in()?;
    if ctx.verify_session().await? {
        success(&format!("{} <{}>", user.display_name(), user.email));
    } else {
        info("The server no longer accepts this session. Run `moodtrack login` again.");
    }
    Ok(())
}

pub async fn health(ctx: &AppContext) -> Result<()> {
    let api = ctx.api()?;
    let reply = api.health().check().await?.check()?;
    success(&format!(
        "{} is {}",
        api.base_url(),
        reply.status.as_deref().unwrap_or("up")
    ));
    Ok(())
}

pub async fn moods(ctx: &AppContext) -> Result<()> {
    ctx.require_patient()?;
    let tracker = MoodTracker::new(ctx.api()?.clone());
    let overview = tracker.load().await?;

    match overview.today_mood {
        Some(ref today) if overview.today_tracked => {
            success(&format!("Today: {}/{}", today.rate, overview.range.max))
        }
        _ => info("Today's mood is not recorded yet"),
    }
    print_stats(&MoodStats::compute(&overview.moods, Utc::now()));
    print_moods(&overview.moods);
    Ok(())
}

pub async fn mood(ctx: &AppContext, action: MoodAction) -> Result<()> {
    ctx.require_patient()?;
    let tracker = MoodTracker::new(ctx.api()?.clone());
    // Pick up the server's rating range before validating
    tracker.load().await?;

    match action {
        MoodAction::Add { rate } => {
            let mood = tracker.submit(rate).await?;
            success(&format!("Recorded {}/{}", mood.rate, tracker.range().max));
        }
        MoodAction::Update { rate } => {
            let mood = tracker.amend(rate).await?;
            success(&format!("Updated today's mood to {}/{}", mood.rate, tracker.range().max));
        }
        MoodAction::Remove => {
            let reply = tracker.clear_today().await?;
            success(reply.message.as_deref().unwrap_or("Today's mood deleted"));
        }
    }
    Ok(())
}

pub async fn patients(ctx: &AppContext) -> Result<()> {
    ctx.require_doctor()?;
    let roster = ctx.api()?.doctor().get_patients().await?.check()?;
    print_patient_table("My patients", &roster.my_patients);
    println!();
    print_patient_table("Unassigned patients", &roster.unassigned_patients);
    Ok(())
}

pub async fn assign(ctx: &AppContext, patient_id: &str) -> Result<()> {
    ctx.require_doctor()?;
    let reply = ctx.api()?.doctor().assign_patient(patient_id).await?.check()?;
    success(reply.message().unwrap_or("Patient assigned"));
    Ok(())
}

pub async fn unassign(ctx: &AppContext, patient_id: &str) -> Result<()> {
    ctx.require_doctor()?;
    let reply = ctx.api()?.doctor().unassign_patient(patient_id).await?.check()?;
    success(reply.message().unwrap_or("Patient unassigned"));
    Ok(())
}

pub async fn patient_moods(ctx: &AppContext, patient_id: &str) -> Result<()> {
    ctx.require_doctor()?;
    let reply = ctx.api()?.doctor().get_patient_moods(patient_id).await?.check()?;

    if let Some(ref patient) = reply.patient {
        println!("{} <{}>", patient.name, patient.email);
    }
    print_stats(&MoodStats::compute(&reply.moods, Utc::now()));
    print_patient_moods(&reply.moods);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("No value entered");
    }
    Ok(value)
}
