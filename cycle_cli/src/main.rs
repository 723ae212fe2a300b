use clap::{Args, Parser, Subcommand};
use cycle_core::cycle_plugin;
use cycle_core::notes;
use cycle_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cyclekit")]
#[command(about = "Cycle prediction and calendar overlay tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Cycle settings; omitted values come from the config file
#[derive(Args, Clone, Debug)]
struct CycleArgs {
    /// First day of the most recent cycle (YYYY-MM-DD)
    #[arg(long)]
    start: Option<CalendarDate>,

    /// Cycle length in days (21-35)
    #[arg(long)]
    length: Option<u32>,

    /// Luteal phase in days (10 to cycle length - 5)
    #[arg(long)]
    luteal: Option<u32>,

    /// Number of cycles to predict (1-12)
    #[arg(long)]
    count: Option<u32>,

    /// Fertile days before ovulation
    #[arg(long)]
    before: Option<u32>,

    /// Fertile days after ovulation
    #[arg(long)]
    after: Option<u32>,
}

impl CycleArgs {
    /// Overlay the flags on `base`
    fn apply(&self, mut base: CycleParameters) -> CycleParameters {
        if let Some(start) = self.start {
            base.start_date = start;
        }
        if let Some(length) = self.length {
            base.cycle_length = length;
        }
        if let Some(luteal) = self.luteal {
            base.luteal_phase = luteal;
        }
        if let Some(count) = self.count {
            base.prediction_count = count;
        }
        if let Some(before) = self.before {
            base.fertile_window.days_before_ovulation = before;
        }
        if let Some(after) = self.after {
            base.fertile_window.days_after_ovulation = after;
        }
        base
    }

    fn parameters(&self, config: &Config) -> Result<CycleParameters> {
        let start = self
            .start
            .ok_or_else(|| Error::Other("--start is required".into()))?;
        Ok(self.apply(config.prediction.parameters(start)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict upcoming cycles
    Predict {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a month calendar with predicted events
    Calendar {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Any day of the month to show (defaults to the start month)
        #[arg(long)]
        month: Option<CalendarDate>,

        /// Months to move forward (negative moves back)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },

    /// Show the events on a single date
    Classify {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Date to classify (YYYY-MM-DD)
        #[arg(long)]
        date: CalendarDate,
    },

    /// Write cycle predictions into a habit's plugin data
    Sync {
        /// Habit JSON exported by the host
        #[arg(long)]
        habit: PathBuf,

        #[command(flatten)]
        cycle: CycleArgs,
    },

    /// Write or clear a dated note on a habit
    Note {
        /// Habit JSON exported by the host
        #[arg(long)]
        habit: PathBuf,

        /// Day the note belongs to (YYYY-MM-DD)
        #[arg(long)]
        date: CalendarDate,

        /// Note text
        #[arg(long, conflicts_with = "clear", required_unless_present = "clear")]
        text: Option<String>,

        /// Remove the note for this day
        #[arg(long)]
        clear: bool,
    },

    /// List the built-in plugins
    Plugins,
}

fn main() -> Result<()> {
    // Initialize logging
    cycle_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Predict { cycle, json } => cmd_predict(&cycle, json, &config),
        Commands::Calendar {
            cycle,
            month,
            offset,
        } => cmd_calendar(&cycle, month, offset, &config),
        Commands::Classify { cycle, date } => cmd_classify(&cycle, date, &config),
        Commands::Sync { habit, cycle } => cmd_sync(habit, &cycle, &config),
        Commands::Note {
            habit,
            date,
            text,
            clear,
        } => cmd_note(habit, date, text, clear, &config),
        Commands::Plugins => cmd_plugins(),
    }
}

/// Print every invalid field so the user can fix them all at once
fn report_invalid(params: &CycleParameters) {
    for problem in params.validate() {
        eprintln!("Invalid {:?}: {}", problem.field(), problem);
    }
}

fn predict_or_report(params: &CycleParameters) -> Result<Vec<CyclePrediction>> {
    generate_predictions(params).map_err(|e| {
        report_invalid(params);
        e
    })
}

fn cmd_predict(cycle: &CycleArgs, json: bool, config: &Config) -> Result<()> {
    let params = cycle.parameters(config)?;
    let predictions = predict_or_report(&params)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    for (i, p) in predictions.iter().enumerate() {
        println!("Cycle {}: {} (next cycle {})", i + 1, p.cycle_start, p.next_cycle_start);
        println!("  Ovulation: {}", p.ovulation_date);
        println!(
            "  Fertile:   {} to {}",
            p.fertile_window.start, p.fertile_window.end
        );
    }

    Ok(())
}

fn cmd_calendar(
    cycle: &CycleArgs,
    month: Option<CalendarDate>,
    offset: i32,
    config: &Config,
) -> Result<()> {
    let params = cycle.parameters(config)?;
    let predictions = predict_or_report(&params)?;
    let events = build_event_map(&predictions);

    let shown = month
        .unwrap_or(params.start_date)
        .shift_months(offset)
        .ok_or_else(|| Error::Other(format!("Month offset {} is out of range", offset)))?;

    println!();
    println!("  {}", shown.naive().format("%B %Y"));
    println!("  Su  Mo  Tu  We  Th  Fr  Sa");

    for week in month_grid(shown) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                let marker = match events.primary(*day) {
                    Some(EventTag::Period) => 'P',
                    Some(EventTag::Ovulation) => 'O',
                    Some(EventTag::Fertile) => 'F',
                    None => ' ',
                };
                if day.same_month(shown) {
                    format!("{:>3}{}", day.day(), marker)
                } else {
                    format!("{:>3}{}", "·", marker)
                }
            })
            .collect();
        println!("{}", row.join(""));
    }

    println!();
    println!("  P = period start, O = ovulation, F = fertile window");
    Ok(())
}

fn cmd_classify(cycle: &CycleArgs, date: CalendarDate, config: &Config) -> Result<()> {
    let params = cycle.parameters(config)?;
    let predictions = predict_or_report(&params)?;
    let tags = build_event_map(&predictions).classify(date);

    let labels: Vec<&str> = tags.iter().map(|t| t.label()).collect();
    let summary = if labels.is_empty() {
        "none".to_string()
    } else {
        labels.join(", ")
    };

    match cycle_day(date, &predictions) {
        Some(day) => println!("{}: {} (cycle day {})", date, summary, day),
        None => println!("{}: {}", date, summary),
    }
    Ok(())
}

fn cmd_sync(habit_path: PathBuf, cycle: &CycleArgs, config: &Config) -> Result<()> {
    let habit = Habit::load_from(&habit_path)?;

    let start = match cycle.start {
        Some(start) => start,
        None => habit.start_day()?,
    };

    // Previously stored settings win over config defaults
    let base = match cycle_plugin::load(&habit.plugin_data)? {
        Some(stored) => stored.parameters(),
        None => config.prediction.parameters(start),
    };
    let mut params = cycle.apply(base);
    params.start_date = start;

    let (plugin_data, data) = cycle_plugin::store_predictions(&habit.plugin_data, &params)
        .map_err(|e| {
            report_invalid(&params);
            e
        })?;
    let updated = habit.apply_partial_update(HabitUpdate {
        plugin_data: Some(plugin_data),
        ..HabitUpdate::default()
    });

    tracing::info!(
        "Synced {} predictions into habit {}",
        data.predictions.len(),
        updated.id
    );
    println!("{}", updated.to_json_pretty()?);
    Ok(())
}

fn cmd_note(
    habit_path: PathBuf,
    date: CalendarDate,
    text: Option<String>,
    clear: bool,
    config: &Config,
) -> Result<()> {
    let habit = Habit::load_from(&habit_path)?;

    let plugin_data = if clear {
        notes::clear_note(&habit.plugin_data, date)?
    } else {
        let text = text.unwrap_or_default();
        notes::set_note(&habit.plugin_data, date, &text, config.notes.max_length)?
    };

    let updated = habit.apply_partial_update(HabitUpdate {
        plugin_data: Some(plugin_data),
        ..HabitUpdate::default()
    });
    println!("{}", updated.to_json_pretty()?);
    Ok(())
}

fn cmd_plugins() -> Result<()> {
    let registry = default_registry();
    let errors = registry.validate();
    if !errors.is_empty() {
        eprintln!("Plugin registry errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Registry("Invalid plugin registry".into()));
    }

    for plugin in registry.plugins() {
        let mut capabilities = Vec::new();
        if plugin.prediction.is_some() {
            capabilities.push("prediction");
        }
        if plugin.notes.is_some() {
            capabilities.push("notes");
        }
        println!(
            "{} {} v{} [{}]",
            plugin.id,
            plugin.metadata.name,
            plugin.metadata.version,
            capabilities.join(", ")
        );
    }
    Ok(())
}
