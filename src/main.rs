use clap::Parser;
use slip_pdf_rust::{batch, cli, config, disambiguator, error, logging, recognizer};
use batch::{BatchOptions, BatchRunner};
use cli::{Cli, Commands};
use config::Config;
use disambiguator::PromptDisambiguator;
use error::Result;
use recognizer::TesseractCli;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --init は既存ファイルが無くても壊れていても書き出す
    if let Commands::Config { show, init: true } = cli.command {
        let (config, path) = Config::init_file(cli.config.as_deref())?;
        println!("✔ デフォルト設定を書き出しました: {}", path.display());
        if show {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        return Ok(());
    }

    let loaded = Config::load(cli.config.as_deref());
    // 読み込み失敗もログに残すため、先にデフォルトのログ先で初期化する
    let log_dir = match &loaded {
        Ok(config) => config.log_dir.clone(),
        Err(_) => Config::default().log_dir,
    };
    let _log_guard = logging::init(&log_dir, cli.verbose)?;

    let mut config = loaded.inspect_err(|e| error!("設定の読み込みに失敗しました: {}", e))?;

    match cli.command {
        Commands::Run(args) => {
            args.apply(&mut config);
            config
                .validate()
                .inspect_err(|e| error!("設定が不正です: {}", e))?;
            info!("開始");

            let tesseract = TesseractCli::new(&config.tesseract_cmd);
            let prompt = PromptDisambiguator::new(
                config.locations.locations().into_iter().map(String::from).collect(),
            );
            let options = BatchOptions {
                dry_run: args.dry_run,
                continue_on_error: args.continue_on_error,
            };

            let mut runner = BatchRunner::new(&config, &tesseract).with_options(options);
            if args.ask {
                runner = runner.with_disambiguator(&prompt);
            }

            match runner.run() {
                Ok(report) => {
                    if report.found == 0 {
                        info!("処理するファイルはありませんでした");
                    } else {
                        info!("すべてのファイルを処理しました");
                    }
                }
                Err(e) => {
                    error!("処理中にエラーが発生しました: {}", e);
                    return Err(e);
                }
            }
            info!("終了");
        }

        Commands::Match { text } => {
            config.locations.validate()?;
            println!("{}", config.locations.find_match(&text));
        }

        Commands::Config { .. } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Doctor => {
            let tesseract = TesseractCli::new(&config.tesseract_cmd);
            match tesseract.version() {
                Ok(version) => println!("✔ {} ({})", version, tesseract.command().display()),
                Err(e) => println!("✗ {}", e),
            }
            match config.validate() {
                Ok(()) => println!("✔ 設定OK ({}店舗キー)", config.locations.len()),
                Err(e) => println!("✗ {}", e),
            }
        }
    }

    Ok(())
}
