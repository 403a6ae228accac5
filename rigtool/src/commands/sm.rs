//! Animation state machine command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use rig_anim::envelope::{STATE_MACHINE_MAGIC, has_header};
use rig_anim::state_machine::decode_state_machine;
use rig_anim::{ClipCache, ClipSet, DirectorySource, StateMachine, StateMachineInstance};

use super::{display_name, read_file, resource_id_for};
use crate::utils::{add_table_row, create_table, format_bytes, format_seconds};

#[derive(Subcommand)]
pub enum SmCommands {
    /// Display clips, states and transitions of a state machine file
    Info {
        /// Path to the state machine file
        file: PathBuf,

        /// Resource identifier (defaults to the numeric file name)
        #[arg(long)]
        uid: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every state, clip and transition reference resolves
    Validate {
        /// Path to the state machine file
        file: PathBuf,
    },

    /// Load every referenced clip from a clip directory
    Check {
        /// Path to the state machine file
        file: PathBuf,

        /// Directory holding <uid>.clip files
        #[arg(long, env = "RIGTOOL_CLIP_DIR")]
        clip_dir: PathBuf,
    },

    /// Fire triggers against a runtime instance and print each tick
    Simulate {
        /// Path to the state machine file
        file: PathBuf,

        /// Directory holding <uid>.clip files
        #[arg(long, env = "RIGTOOL_CLIP_DIR")]
        clip_dir: PathBuf,

        /// Trigger to fire, in order (can be repeated)
        #[arg(short, long = "trigger")]
        triggers: Vec<String>,

        /// Seconds per tick
        #[arg(long, default_value_t = 0.1)]
        step: f32,

        /// Ticks to run after each trigger
        #[arg(long, default_value_t = 5)]
        ticks: u32,
    },
}

pub fn execute(command: SmCommands) -> Result<()> {
    match command {
        SmCommands::Info { file, uid, json } => execute_info(&file, uid, json),
        SmCommands::Validate { file } => execute_validate(&file),
        SmCommands::Check { file, clip_dir } => execute_check(&file, &clip_dir),
        SmCommands::Simulate {
            file,
            clip_dir,
            triggers,
            step,
            ticks,
        } => execute_simulate(&file, &clip_dir, &triggers, step, ticks),
    }
}

/// Read and decode a state machine file
pub fn load_state_machine(path: &Path, uid: Option<u64>) -> Result<(StateMachine, Vec<u8>)> {
    let data = read_file(path)?;
    let sm = decode_state_machine(resource_id_for(path, uid), &display_name(path), &data)
        .with_context(|| format!("Failed to parse state machine: {}", path.display()))?;
    Ok((sm, data))
}

fn execute_info(path: &Path, uid: Option<u64>, json: bool) -> Result<()> {
    let (sm, data) = load_state_machine(path, uid)?;
    let headered = has_header(&data, STATE_MACHINE_MAGIC);

    if json {
        return print_json(&sm, data.len(), headered);
    }

    let entry = sm.entry_state().map(|s| s.name.as_str());

    println!("State Machine Information");
    println!("=========================");
    println!();
    println!("File: {}", path.display());
    println!("Size: {}", format_bytes(data.len() as u64));
    println!("Name: {}", sm.name());
    println!("UID: {} ({})", sm.uid(), sm.uid().category());
    println!(
        "Format: {}",
        if headered { "versioned header" } else { "bare" }
    );
    println!("Entry state: {}", entry.unwrap_or("-"));
    println!("Triggers: {}", sm.triggers().join(", "));

    println!();
    println!("Clips ({}):", sm.clips().len());
    let mut clips = create_table(vec!["Name", "UID", "Looping"]);
    for clip in sm.clips() {
        add_table_row(
            &mut clips,
            vec![
                clip.name.clone(),
                clip.uid.to_string(),
                clip.looping.to_string(),
            ],
        );
    }
    clips.printstd();

    println!();
    println!("States ({}):", sm.states().len());
    let mut states = create_table(vec!["Name", "Clip", "Entry"]);
    for state in sm.states() {
        add_table_row(
            &mut states,
            vec![
                state.name.clone(),
                state.clip_name.clone(),
                if Some(state.name.as_str()) == entry { "*" } else { "" }.to_string(),
            ],
        );
    }
    states.printstd();

    println!();
    println!("Transitions ({}):", sm.transitions().len());
    let mut transitions = create_table(vec!["From", "Trigger", "To", "Blend"]);
    for transition in sm.transitions() {
        add_table_row(
            &mut transitions,
            vec![
                transition.from.clone(),
                transition.trigger.clone(),
                transition.to.clone(),
                format!("{} ms", transition.blend_time_ms),
            ],
        );
    }
    transitions.printstd();

    Ok(())
}

#[cfg(feature = "json")]
fn print_json(sm: &StateMachine, size: usize, headered: bool) -> Result<()> {
    let summary = serde_json::json!({
        "name": sm.name(),
        "uid": sm.uid().0,
        "size": size,
        "headered": headered,
        "entry_state": sm.entry_state().map(|s| s.name.as_str()),
        "clips": sm.clips().iter().map(|c| serde_json::json!({
            "name": c.name,
            "uid": c.uid.0,
            "looping": c.looping,
        })).collect::<Vec<_>>(),
        "states": sm.states().iter().map(|s| serde_json::json!({
            "name": s.name,
            "clip": s.clip_name,
        })).collect::<Vec<_>>(),
        "transitions": sm.transitions().iter().map(|t| serde_json::json!({
            "from": t.from,
            "to": t.to,
            "trigger": t.trigger,
            "blend_time_ms": t.blend_time_ms,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(not(feature = "json"))]
fn print_json(_sm: &StateMachine, _size: usize, _headered: bool) -> Result<()> {
    anyhow::bail!("JSON output requires the `json` feature")
}

fn execute_validate(path: &Path) -> Result<()> {
    use console::style;

    let (sm, _) = load_state_machine(path, None)?;
    let issues = sm.validation_issues();
    if !issues.is_empty() {
        for issue in &issues {
            println!("{} {}", style("✗").red(), issue);
        }
        anyhow::bail!("Validation failed: {} issues", issues.len());
    }

    println!(
        "{} {} is valid ({} states, {} transitions)",
        style("✓").green(),
        path.display(),
        sm.states().len(),
        sm.transitions().len()
    );
    Ok(())
}

fn execute_check(path: &Path, clip_dir: &Path) -> Result<()> {
    use console::style;

    let (sm, _) = load_state_machine(path, None)?;
    let source = DirectorySource::new(clip_dir);
    let mut table = create_table(vec!["Clip", "UID", "File", "Status"]);
    let mut missing = 0usize;

    let cache = ClipCache::new(source.clone());
    for info in sm.clips() {
        let file = source.path_for(info.uid).display().to_string();
        let status = match cache.request(info.uid) {
            Ok(clip) => format!(
                "{} {} channels, {}",
                style("✓").green(),
                clip.channel_count(),
                format_seconds(clip.duration())
            ),
            Err(err) => {
                missing += 1;
                format!("{} {}", style("✗").red(), err)
            }
        };
        add_table_row(
            &mut table,
            vec![info.name.clone(), info.uid.to_string(), file, status],
        );
    }
    table.printstd();

    if missing > 0 {
        anyhow::bail!("{} of {} clips could not be loaded", missing, sm.clips().len());
    }
    println!(
        "{} All {} clips of {} load from {}",
        style("✓").green(),
        sm.clips().len(),
        sm.name(),
        clip_dir.display()
    );
    Ok(())
}

fn execute_simulate(
    path: &Path,
    clip_dir: &Path,
    triggers: &[String],
    step: f32,
    ticks: u32,
) -> Result<()> {
    let (sm, _) = load_state_machine(path, None)?;
    sm.validate()
        .with_context(|| format!("State machine {} is not valid", sm.name()))?;

    let mut sim = Simulation {
        cache: ClipCache::new(DirectorySource::new(clip_dir)),
        clips: ClipSet::new(),
        instance: StateMachineInstance::new(sm),
        table: create_table(vec!["Tick", "Event", "Active", "Target", "Blend", "Time"]),
        tick: 0,
    };

    sim.run("start".to_string(), step, ticks);
    for trigger in triggers {
        sim.clips.sync(&sim.cache, &sim.instance.required_clips());
        let event = if sim.instance.fire(trigger, &sim.clips) {
            trigger.clone()
        } else {
            format!("{trigger} (ignored)")
        };
        sim.run(event, step, ticks);
    }
    sim.table.printstd();
    Ok(())
}

struct Simulation {
    cache: ClipCache,
    clips: ClipSet,
    instance: StateMachineInstance,
    table: prettytable::Table,
    tick: u32,
}

impl Simulation {
    fn run(&mut self, event: String, step: f32, ticks: u32) {
        let mut label = Some(event);
        for _ in 0..ticks {
            self.clips.sync(&self.cache, &self.instance.required_clips());
            self.instance.update(step, &self.clips);
            self.tick += 1;
            add_table_row(
                &mut self.table,
                vec![
                    self.tick.to_string(),
                    label.take().unwrap_or_default(),
                    self.instance.active_state().unwrap_or("-").to_string(),
                    self.instance.target_state().unwrap_or("-").to_string(),
                    self.instance
                        .blend_progress()
                        .map_or_else(|| "-".to_string(), |p| format!("{:.0}%", p * 100.0)),
                    format_seconds(self.instance.sampler().current_time()),
                ],
            );
        }
    }
}
