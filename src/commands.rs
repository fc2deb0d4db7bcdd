use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{self, Settings};
use crate::error::{Error, Result};
use crate::gitmeta::{self, RepoProbe};
use crate::surface::{self, QuickFix};
use crate::todo::{self, TodoComment};
use crate::tracker::{CreatedIssue, Tracker};

pub struct CreateArgs<'a> {
    pub settings_path: &'a Path,
    pub file: &'a Path,
    pub line: usize,
    pub end_line: Option<usize>,
    pub open: bool,
}

/// Promote the TODO on a source line to a tracker task and write the
/// assigned identifier back into the comment.
///
/// Local checks run first; the gateway is only built once there is something
/// to create, so a missing API key never masks a "nothing to do" outcome.
pub fn create(args: &CreateArgs) -> Result<()> {
    let start_text = read_line_at(args.file, args.line)?;
    let end_text = match args.end_line {
        Some(n) if n != args.line => read_line_at(args.file, n)?,
        _ => start_text.clone(),
    };

    let comment = match surface::quick_fix(&start_text, &end_text) {
        QuickFix::Offer(comment) => comment,
        QuickFix::MultiLineSelection => {
            eprintln!("selection spans multiple lines; place the cursor on the TODO line");
            return Ok(());
        }
        QuickFix::NoTodo => {
            eprintln!("no TODO marker on {}:{}", args.file.display(), args.line);
            return Ok(());
        }
    };

    if let Some(existing) = &comment.identifier {
        eprintln!("line already references {existing}; not creating a duplicate");
        return Ok(());
    }

    let tracker = build_tracker(args.settings_path)?;
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let issue = promote(args.file, args.line, &comment, &tracker, &root)?;

    println!("created {}: {}", issue.identifier, issue.url);
    if args.open {
        open_in_browser(&issue.url);
    }
    Ok(())
}

/// Create the remote issue, then rewrite the comment line on disk.
fn promote(
    file: &Path,
    line: usize,
    comment: &TodoComment,
    tracker: &Tracker,
    root: &Path,
) -> Result<CreatedIssue> {
    let title = if comment.description.is_empty() {
        "TODO"
    } else {
        comment.description.as_str()
    };
    let description = issue_description(file, line, root);

    let issue = tracker.create_issue(title, &description)?;

    rewrite_line(file, line, &todo::annotate(&comment.line, &issue.identifier))?;
    info!(identifier = %issue.identifier, file = %file.display(), line, "task created");
    Ok(issue)
}

/// Issue body: where the TODO lives, plus a deep link when git metadata
/// allows one.
fn issue_description(file: &Path, line: usize, root: &Path) -> String {
    let mut body = format!("From `{}` line {line}.", file.display());
    match gitmeta::probe(root) {
        RepoProbe::Found(info) => {
            let rel = file.strip_prefix(root).unwrap_or(file);
            if let Some(link) = gitmeta::deep_link(&info, &rel.to_string_lossy(), line) {
                body.push_str(&format!("\n\n[Open in repository]({link})"));
            }
        }
        RepoProbe::NotARepo => debug!("not a git repository; skipping deep link"),
        RepoProbe::Unparsable => debug!("git metadata unparsable; skipping deep link"),
    }
    body
}

/// Hover analog: render a one-line summary for the identifier on a line.
/// No identifier, or a failed lookup, renders nothing.
pub fn show(settings_path: &Path, file: &Path, line: usize) -> Result<()> {
    let text = read_line_at(file, line)?;
    let Some(identifier) = surface::hover_identifier(&text) else {
        debug!(file = %file.display(), line, "no identifier on line; nothing to show");
        return Ok(());
    };

    let tracker = build_tracker(settings_path)?;
    if let Some(summary) = hover_summary(&tracker, &identifier) {
        println!("{summary}");
    }
    Ok(())
}

fn hover_summary(tracker: &Tracker, identifier: &str) -> Option<String> {
    match tracker.get_issue(identifier) {
        Ok(issue) => Some(surface::render_hover(&issue)),
        Err(e) => {
            debug!(error = %e, identifier, "issue lookup failed; skipping hover");
            None
        }
    }
}

/// Dry probe of the quick-fix surface: print the action a selection would
/// offer. Never touches the network.
pub fn check(file: &Path, line: usize, end_line: Option<usize>) -> Result<()> {
    let start_text = read_line_at(file, line)?;
    let end_text = match end_line {
        Some(n) if n != line => read_line_at(file, n)?,
        _ => start_text.clone(),
    };

    match surface::quick_fix(&start_text, &end_text) {
        QuickFix::Offer(comment) => println!("create task: {}", comment.description),
        QuickFix::MultiLineSelection => eprintln!("selection spans multiple lines"),
        QuickFix::NoTodo => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration commands
// ---------------------------------------------------------------------------

/// Store the API key after checking the tracker's literal prefix.
pub fn configure_api_key(settings_path: &Path, key: &str) -> Result<()> {
    config::validate_api_key(key)?;
    config::store_key(settings_path, "api_key", key)?;
    eprintln!("API key stored in {}", settings_path.display());
    Ok(())
}

pub fn configure_team(settings_path: &Path) -> Result<()> {
    let tracker = build_tracker(settings_path)?;
    configure_team_with(
        settings_path,
        &tracker,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )
}

fn configure_team_with(
    settings_path: &Path,
    tracker: &Tracker,
    stdin: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<()> {
    let choices: Vec<(String, String)> = tracker
        .list_teams()?
        .into_iter()
        .map(|t| (t.id, format!("{} ({})", t.name, t.key)))
        .collect();
    let id = choose("team", &choices, stdin, stderr)?;
    config::store_key(settings_path, "team_id", &id)?;
    eprintln!("team saved");
    Ok(())
}

pub fn configure_project(settings_path: &Path) -> Result<()> {
    let tracker = build_tracker(settings_path)?;
    configure_project_with(
        settings_path,
        &tracker,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )
}

fn configure_project_with(
    settings_path: &Path,
    tracker: &Tracker,
    stdin: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<()> {
    let choices: Vec<(String, String)> = tracker
        .list_projects()?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let id = choose("project", &choices, stdin, stderr)?;
    config::store_key(settings_path, "project_id", &id)?;
    eprintln!("project saved");
    Ok(())
}

pub fn configure_cycle(settings_path: &Path) -> Result<()> {
    let tracker = build_tracker(settings_path)?;
    configure_cycle_with(
        settings_path,
        &tracker,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )
}

fn configure_cycle_with(
    settings_path: &Path,
    tracker: &Tracker,
    stdin: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<()> {
    let choices: Vec<(String, String)> = tracker
        .list_cycles()?
        .into_iter()
        .map(|c| {
            let label = c.name.clone().unwrap_or_else(|| format!("Cycle {}", c.number));
            (c.id, label)
        })
        .collect();
    let id = choose("cycle", &choices, stdin, stderr)?;
    config::store_key(settings_path, "cycle_id", &id)?;
    eprintln!("cycle saved");
    Ok(())
}

pub fn configure_status(settings_path: &Path) -> Result<()> {
    let tracker = build_tracker(settings_path)?;
    configure_status_with(
        settings_path,
        &tracker,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )
}

fn configure_status_with(
    settings_path: &Path,
    tracker: &Tracker,
    stdin: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<()> {
    let choices: Vec<(String, String)> = tracker
        .list_workflow_states()?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let id = choose("status", &choices, stdin, stderr)?;
    config::store_key(settings_path, "status_id", &id)?;
    eprintln!("status saved");
    Ok(())
}

/// Print current settings with the API key redacted.
pub fn configure_show(settings_path: &Path) -> Result<()> {
    let settings = Settings::load(settings_path)?;
    println!(
        "api_key: {}",
        if settings.api_key.is_some() { "set" } else { "unset" }
    );
    println!("team_id: {}", settings.team_id.as_deref().unwrap_or("unset"));
    println!(
        "project_id: {}",
        settings.project_id.as_deref().unwrap_or("unset")
    );
    println!("cycle_id: {}", settings.cycle_id.as_deref().unwrap_or("unset"));
    println!(
        "status_id: {}",
        settings.status_id.as_deref().unwrap_or("unset")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_tracker(settings_path: &Path) -> Result<Tracker> {
    let settings = Settings::load(settings_path)?;
    Tracker::new(&settings)
}

fn read_line_at(path: &Path, line_no: usize) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .nth(line_no.saturating_sub(1))
        .map(str::to_string)
        .ok_or_else(|| Error::LineOutOfRange(path.to_path_buf(), line_no))
}

/// Replace one line of a file, leaving every other line untouched.
fn rewrite_line(path: &Path, line_no: usize, new_line: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let mut lines: Vec<&str> = content.split('\n').collect();
    let idx = line_no.saturating_sub(1);
    if idx >= lines.len() {
        return Err(Error::LineOutOfRange(path.to_path_buf(), line_no));
    }
    lines[idx] = new_line;
    std::fs::write(path, lines.join("\n"))?;
    Ok(())
}

/// Numbered selection over (id, label) pairs. A single candidate is picked
/// automatically. Reader and writer are injected so tests can drive the
/// prompt.
fn choose(
    what: &str,
    choices: &[(String, String)],
    stdin: &mut dyn BufRead,
    stderr: &mut dyn Write,
) -> Result<String> {
    if choices.is_empty() {
        return Err(Error::Tracker(format!("no {what}s found")));
    }
    if choices.len() == 1 {
        writeln!(stderr, "Found one {what}: {}", choices[0].1).ok();
        return Ok(choices[0].0.clone());
    }

    writeln!(stderr, "Select a {what}:").ok();
    for (i, (_, label)) in choices.iter().enumerate() {
        writeln!(stderr, "  {}) {label}", i + 1).ok();
    }
    write!(stderr, "Choice [1-{}]: ", choices.len()).ok();
    stderr.flush().ok();

    let mut line = String::new();
    stdin.read_line(&mut line)?;

    let choice: usize = line
        .trim()
        .parse()
        .map_err(|_| Error::ConfigValidation(format!("invalid choice: {}", line.trim())))?;
    if choice < 1 || choice > choices.len() {
        return Err(Error::ConfigValidation(format!(
            "choice out of range: {} (expected 1-{})",
            choice,
            choices.len()
        )));
    }
    Ok(choices[choice - 1].0.clone())
}

/// Fire-and-forget platform browser launch; failure only logs.
fn open_in_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    if let Err(e) = std::process::Command::new(opener).arg(url).spawn() {
        debug!(error = %e, "failed to open browser");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
