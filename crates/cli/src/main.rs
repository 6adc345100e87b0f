use clap::{Parser, Subcommand};
use paeon_core::{
    audit::TracingAuditSink, balance::FairBalanceInput, language::supported_languages,
    language::WhatlangDetector, BalanceService, Collaborators, CoreConfig, Lexicon,
    PiiRedactor, StaticLabelSource, TranslationRequest, TranslationService,
};
use paeon_llm::{language_models, GeminiConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "paeon")]
#[command(about = "Paeon clinical translation and fair-balance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a symptom description into clinical terms
    Translate {
        /// Patient description in any supported language
        text: String,
        /// Optional clinical context
        #[arg(long)]
        context: Option<String>,
        /// Session tracking id
        #[arg(long)]
        session: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Redact PII from text
    Redact {
        text: String,
        /// Also print a partially masked copy
        #[arg(long)]
        mask: bool,
    },
    /// Score content for fair balance
    ScoreBalance {
        /// Benefit statement (repeatable)
        #[arg(long = "benefit")]
        benefits: Vec<String>,
        /// Risk or safety statement (repeatable)
        #[arg(long = "risk")]
        risks: Vec<String>,
        /// Contraindication (repeatable)
        #[arg(long = "contraindication")]
        contraindications: Vec<String>,
        #[arg(long)]
        boxed_warning: Option<String>,
        #[arg(long)]
        disclaimer: Option<String>,
    },
    /// Score the patient education content for a known drug
    Drug {
        /// Generic or brand name
        name: String,
        /// Leave the boxed warning out of the content
        #[arg(long)]
        no_boxed_warning: bool,
    },
    /// List supported input languages
    Languages,
    /// List curated lexicon entries
    Lexicon,
}

fn translation_service(cfg: &CoreConfig) -> Result<TranslationService, Box<dyn std::error::Error>> {
    let lexicon = Lexicon::load(cfg.lexicon_path())?;
    let (adapter, mapper) = language_models(GeminiConfig::from_env()?);
    let collaborators = Collaborators {
        detector: Arc::new(WhatlangDetector::new()),
        adapter,
        mapper,
        audit: Arc::new(TracingAuditSink),
    };
    Ok(TranslationService::new(cfg, Arc::new(lexicon), collaborators))
}

fn balance_service(cfg: &CoreConfig) -> BalanceService {
    BalanceService::new(
        Arc::new(StaticLabelSource::with_defaults()),
        Arc::new(TracingAuditSink),
        cfg.audit_salt(),
    )
}

fn print_assessment(a: &paeon_core::FairBalanceAssessment) {
    println!("Benefit words: {}", a.benefit_words);
    println!("Risk words: {}", a.risk_words);
    println!("Balance ratio: {:.2}", a.balance_ratio);
    println!("Score: {:.2}", a.score);
    println!("Compliant: {}", a.compliant);
    if let Some(note) = &a.note {
        println!("Note: {note}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Translate {
            text,
            context,
            session,
            json,
        }) => {
            let cfg = CoreConfig::from_env()?;
            let service = translation_service(&cfg)?;
            let request = TranslationRequest {
                text,
                context,
                session_id: session,
                actor_id: None,
            };
            match service.translate(&request).await {
                Ok(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
                Ok(result) => {
                    println!("Language: {} ({})", result.original_language, result.language_code);
                    println!("Input: {}", result.raw_input);
                    println!("English: {}", result.normalized_english);
                    println!("Clinical: {}", result.clinical_term);
                    for code in &result.codes {
                        println!("  {} {} {}", code.system, code.code, code.display);
                    }
                    println!("Confidence: {}", result.confidence);
                    println!("Provenance: {}", result.provenance);
                    println!("Rationale: {}", result.rationale);
                    if !result.safety_flags.is_empty() {
                        let flags: Vec<&str> =
                            result.safety_flags.iter().map(|f| f.as_str()).collect();
                        println!("Safety flags: {}", flags.join(", "));
                    }
                    if result.degraded {
                        println!("Degraded: a collaborator was unavailable");
                    }
                }
                Err(e) => eprintln!("Error translating: {}", e),
            }
        }
        Some(Commands::Redact { text, mask }) => {
            let redactor = PiiRedactor::new();
            let (redacted, report) = redactor.redact(&text);
            println!("{redacted}");
            if mask {
                println!("{}", redactor.mask_partial(&text, '*'));
            }
            if report.pii_detected() {
                let categories: Vec<&str> = report.categories.iter().map(|c| c.as_str()).collect();
                eprintln!(
                    "Redacted {} match(es): {}",
                    report.match_count,
                    categories.join(", ")
                );
            }
        }
        Some(Commands::ScoreBalance {
            benefits,
            risks,
            contraindications,
            boxed_warning,
            disclaimer,
        }) => {
            let cfg = CoreConfig::from_env()?;
            let input = FairBalanceInput {
                benefits,
                risks,
                contraindications,
                boxed_warning,
                disclaimer,
            };
            let assessment = balance_service(&cfg).score(&input, None, None);
            print_assessment(&assessment);
        }
        Some(Commands::Drug {
            name,
            no_boxed_warning,
        }) => {
            let cfg = CoreConfig::from_env()?;
            match balance_service(&cfg)
                .score_drug(&name, !no_boxed_warning, None)
                .await
            {
                Some(balance) => {
                    println!(
                        "{} ({}), {}",
                        balance.label.display_name(),
                        balance.label.generic_name,
                        balance.label.drug_class
                    );
                    print_assessment(&balance.assessment);
                }
                None => eprintln!("No label found for {}", name),
            }
        }
        Some(Commands::Languages) => {
            for lang in supported_languages() {
                println!("{:<6} {:<12} {}", lang.code, lang.name, lang.native_name);
            }
        }
        Some(Commands::Lexicon) => {
            let cfg = CoreConfig::from_env()?;
            let lexicon = Lexicon::load(cfg.lexicon_path())?;
            for entry in lexicon.entries() {
                println!(
                    "{:<22} {:<32} {}",
                    entry.expression, entry.clinical, entry.body_system
                );
            }
        }
        None => {
            println!("Use 'paeon --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_balance_flags() {
        let cli = Cli::parse_from([
            "paeon",
            "score-balance",
            "--benefit",
            "Lowers sugar",
            "--benefit",
            "Once weekly",
            "--risk",
            "Nausea",
        ]);
        match cli.command {
            Some(Commands::ScoreBalance {
                benefits, risks, ..
            }) => {
                assert_eq!(benefits.len(), 2);
                assert_eq!(risks, vec!["Nausea"]);
            }
            _ => panic!("expected score-balance"),
        }
    }
}
