use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use surveyor::{
    export_ledger, Config, CsvRecordStore, ErrorCategory, FieldKind, FormSession, ImageStore,
    RecordStore, Survey,
};

const IMAGE_PATH_SEPARATOR: char = ';';

#[derive(Parser, Debug)]
#[command(
    name = "surveyor",
    version,
    about = "Supervisor field survey form: look up an account, record the on-site remark, store the photos"
)]
struct Cli {
    /// JSON config file; relative paths inside it resolve against its folder
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill survey forms at the terminal (default)
    Form,
    /// Print the active remark table as JSON
    Remarks,
    /// Write the xlsx report of everything submitted so far
    Export {
        /// Output file, or a folder to write survey_report.xlsx into
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command.unwrap_or(Commands::Form) {
        Commands::Form => {
            let survey = Survey::init(&config)?;
            let stdin = io::stdin();
            let mut prompt = Prompt {
                input: stdin.lock(),
                output: io::stdout(),
            };
            run_forms(&survey, &mut prompt)
        }
        Commands::Remarks => {
            let policy = config.policy()?;
            println!("{}", serde_json::to_string_pretty(policy.definitions())?);
            Ok(())
        }
        Commands::Export { dest } => {
            let ledger = CsvRecordStore::new(&config.output_file);
            let path = export_ledger(&ledger, &dest)
                .with_context(|| format!("failed to export {}", config.output_file.display()))?;
            println!("report written to {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            Ok(Config::load(path)?.relative_to(base))
        }
        None => Ok(Config::default()),
    }
}

struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// `None` once input is exhausted.
    fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", question))?;
        Ok(answer.is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y")))
    }

    fn say(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

fn run_forms<R, I, In, Out>(survey: &Survey<R, I>, prompt: &mut Prompt<In, Out>) -> anyhow::Result<()>
where
    R: RecordStore,
    I: ImageStore,
    In: BufRead,
    Out: Write,
{
    prompt.say("Supervisor Field Survey - IDF Cases")?;
    prompt.say("Please fill this form after on-site verification of IDF accounts.")?;
    loop {
        let Some(raw) = prompt.ask("ENTER ACCT_ID (blank to quit)")? else {
            return Ok(());
        };
        if raw.trim().is_empty() {
            return Ok(());
        }
        let mut session = survey.session();
        match session.enter_account(raw.trim()) {
            Ok(record) => {
                prompt.say("ACCT_ID matched. Details below:")?;
                for (label, value) in record.details() {
                    prompt.say(&format!("  {}: {}", label, value))?;
                }
            }
            Err(err) => {
                prompt.say(&err.to_string())?;
                continue;
            }
        }
        if !fill_form(&mut session, survey, prompt)? {
            return Ok(());
        }
        if prompt.confirm("Submit")? {
            submit(&mut session, survey, prompt)?;
        } else {
            prompt.say("Discarded.")?;
        }
    }
}

/// Walks the surveyor through one form. `false` when input ran out.
fn fill_form<R, I, In, Out>(
    session: &mut FormSession<'_>,
    survey: &Survey<R, I>,
    prompt: &mut Prompt<In, Out>,
) -> anyhow::Result<bool>
where
    R: RecordStore,
    I: ImageStore,
    In: BufRead,
    Out: Write,
{
    let names = survey.policy().names();
    let remark = loop {
        for (index, name) in names.iter().enumerate() {
            prompt.say(&format!("  {}. {}", index + 1, name))?;
        }
        let Some(choice) = prompt.ask("Select REMARK")? else {
            return Ok(false);
        };
        let name = match choice.trim().parse::<usize>() {
            Ok(number) if (1..=names.len()).contains(&number) => names[number - 1],
            _ => choice.trim(),
        };
        match session.select_remark(name) {
            Ok(remark) => break remark,
            Err(err) => prompt.say(&err.to_string())?,
        }
    };

    if let Some(action) = session.follow_up_action() {
        prompt.say(&format!("Required Remark: {}", action))?;
    }

    while session.needs_mobile() {
        let Some(mobile) = prompt.ask("ENTER CONSUMER MOBILE NUMBER")? else {
            return Ok(false);
        };
        match session.set_mobile(mobile.trim()) {
            Ok(()) => break,
            Err(err) => prompt.say(&err.to_string())?,
        }
    }

    prompt.say("Enter Required Details:")?;
    for field in remark.required_fields.iter() {
        loop {
            match field.kind {
                FieldKind::Text => {
                    let Some(value) = prompt.ask(&field.label)? else {
                        return Ok(false);
                    };
                    if let Err(err) = session.set_text(&field.label, &value) {
                        prompt.say(&err.to_string())?;
                    }
                }
                FieldKind::Image | FieldKind::Document => {
                    let question = format!(
                        "Path to {} photo ({}-separated for several)",
                        field.label, IMAGE_PATH_SEPARATOR
                    );
                    let Some(paths) = prompt.ask(&question)? else {
                        return Ok(false);
                    };
                    for path in paths.split(IMAGE_PATH_SEPARATOR).map(str::trim) {
                        if path.is_empty() {
                            continue;
                        }
                        let attached = fs::read(path)
                            .with_context(|| format!("failed to read {}", path))
                            .and_then(|payload| {
                                session
                                    .attach_image(&field.label, payload)
                                    .map(|image| image.file_name())
                                    .map_err(anyhow::Error::from)
                            });
                        match attached {
                            Ok(name) => prompt.say(&format!("{} photo saved as {}", field.label, name))?,
                            Err(err) => prompt.say(&format!("{:#}", err))?,
                        }
                    }
                }
            }
            if !session.missing_fields().contains(&field.label) {
                break;
            }
            prompt.say(&format!("{} is required.", field.label))?;
        }
    }
    Ok(true)
}

fn submit<R, I, In, Out>(
    session: &mut FormSession<'_>,
    survey: &Survey<R, I>,
    prompt: &mut Prompt<In, Out>,
) -> anyhow::Result<()>
where
    R: RecordStore,
    I: ImageStore,
    In: BufRead,
    Out: Write,
{
    loop {
        match session.submit(survey.sink()) {
            Ok(_) => return prompt.say("Data submitted successfully!"),
            Err(err) if err.category() == ErrorCategory::Persistence => {
                log::warn!("{}", err);
                prompt.say(&err.to_string())?;
                if !prompt.confirm("Retry")? {
                    return prompt.say("Submission NOT saved.");
                }
            }
            Err(err) => return prompt.say(&err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use surveyor::{
        AccountRecord, MasterTable, MemoryImageStore, MemoryRecordStore, RemarkPolicy,
        SubmissionSink,
    };

    use super::*;

    fn survey() -> Survey<MemoryRecordStore, MemoryImageStore> {
        let master = MasterTable::from_records(vec![AccountRecord {
            account_id: "12345".into(),
            zone: "Z1".into(),
            circle: "C1".into(),
            division: "D1".into(),
            sub_division: "S1".into(),
        }]);
        let sink = SubmissionSink::new(MemoryRecordStore::new(), MemoryImageStore::new());
        Survey::new(master, RemarkPolicy::builtin(), sink)
    }

    #[test]
    fn terminal_form_submits_one_row() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let photo = dir.path().join("premises.png");
        fs::write(&photo, b"\x89PNG\r\n\x1a\n")?;

        let survey = survey();
        let script = format!(
            "abc\n99999\n 12345 \n4\n98765\n9876543210\nmissing.png\n{}\ny\n\n",
            photo.display()
        );
        let mut prompt = Prompt {
            input: script.as_bytes(),
            output: Vec::new(),
        };
        run_forms(&survey, &mut prompt)?;

        let output = String::from_utf8(prompt.output)?;
        assert!(output.contains("ACCT_ID should be numeric"));
        assert!(output.contains("ACCT_ID 99999 not found"));
        assert!(output.contains("Required Remark: PD/METER INSTALLATION"));
        assert!(output.contains("mobile number should be exactly 10 digits"));
        assert!(output.contains("PREMISES IMAGE is required."));
        assert!(output.contains("Data submitted successfully!"));

        let rows = survey.sink().records().rows();
        assert_eq!(rows.len(), 1);
        // the typed line is trimmed before the id is checked
        assert_eq!(rows[0][0], "12345");
        assert_eq!(rows[0][1], "NO METER AT SITE");
        assert_eq!(rows[0][6], "9876543210");
        Ok(())
    }

    #[test]
    fn load_config_defaults() -> anyhow::Result<()> {
        assert_eq!(load_config(None)?, Config::default());
        Ok(())
    }
}
