// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use arya_app::{AppState, ScreenKey};
use config::Config;
use runtime::{DEMO_LATENCY, DEMO_SEED, ListRuntime};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `arya --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    logging::initialize_logging(&logging::log_path()?)?;
    info!(
        config = %options.config_path.display(),
        demo = options.demo,
        "starting arya"
    );

    if let Some((lat, lon)) = options.geocode {
        let address = config.geocoder()?.reverse(lat, lon)?;
        println!("{}", address.address);
        println!("{}, {} {}", address.district, address.state, address.pincode);
        return Ok(());
    }

    let page_size = config.page_size();
    let debounce = config.debounce()?;
    let mut runtime = if options.demo {
        ListRuntime::demo(DEMO_SEED, DEMO_LATENCY, page_size, debounce)
    } else {
        let client = config.client().with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/anon_key/timeout values",
                options.config_path.display()
            )
        })?;
        if options.check_only {
            client.ping().context("reach the GraphQL endpoint")?;
        }
        ListRuntime::remote(client, page_size, debounce)
    };
    if options.check_only {
        config.geocoder()?;
        return Ok(());
    }

    if let Some(screen) = options.list {
        let view = runtime.load_first_page(screen)?;
        println!("{}", view.plain_text());
        if let Some(footer) = view.footer_text(screen) {
            println!("{footer}");
        }
        return Ok(());
    }

    arya_tui::run_app(&mut AppState::default(), &mut runtime)
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    demo: bool,
    list: Option<ScreenKey>,
    geocode: Option<(f64, f64)>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        demo: false,
        list: None,
        geocode: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--list requires a screen name"))?;
                options.list = Some(parse_screen(value.as_ref())?);
            }
            "--geocode" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--geocode requires <lat>,<lon>"))?;
                options.geocode = Some(parse_coordinates(value.as_ref())?);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn parse_screen(value: &str) -> Result<ScreenKey> {
    ScreenKey::parse(value).ok_or_else(|| {
        let names: Vec<&str> = ScreenKey::ALL.iter().map(|key| key.as_str()).collect();
        anyhow!("unknown screen {value:?}; expected one of {}", names.join(", "))
    })
}

fn parse_coordinates(value: &str) -> Result<(f64, f64)> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("--geocode expects <lat>,<lon>, got {value:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("invalid latitude {lat:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("invalid longitude {lon:?}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(anyhow!("coordinates out of range: {lat},{lon}"));
    }
    Ok((lat, lon))
}

fn print_help() {
    println!("arya: Arya Mahasangh admin client");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse seeded demo records (no backend)");
    println!("  --check                  Validate config and reach the backend");
    println!("  --list <screen>          Print the first page of a screen and exit");
    println!("                           (ekal-arya, arya-pariwar, arya-samaj, activities)");
    println!("  --geocode <lat>,<lon>    Resolve an address for a coordinate");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, parse_coordinates};
    use anyhow::Result;
    use arya_app::ScreenKey;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/arya-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                demo: false,
                list: None,
                geocode: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for (flag, expected) in [
            ("--config", "--config requires a file path"),
            ("--list", "--list requires a screen name"),
            ("--geocode", "--geocode requires"),
        ] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(expected), "{flag}: {error}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "--demo"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.demo);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_list_screen() -> Result<()> {
        let options = parse_cli_args(vec!["--list", "arya-samaj"], default_options_path())?;
        assert_eq!(options.list, Some(ScreenKey::AryaSamaj));

        let error = parse_cli_args(vec!["--list", "temples"], default_options_path())
            .expect_err("unknown screen should fail");
        assert!(error.to_string().contains("ekal-arya"));
        Ok(())
    }

    #[test]
    fn coordinates_parse_and_range_check() -> Result<()> {
        assert_eq!(parse_coordinates("28.89, 76.60")?, (28.89, 76.60));
        assert!(parse_coordinates("28.89").is_err());
        assert!(parse_coordinates("north,76.6").is_err());
        assert!(parse_coordinates("91,0").is_err());
        Ok(())
    }

    #[test]
    fn help_flag_short_and_long() -> Result<()> {
        assert!(parse_cli_args(vec!["-h"], default_options_path())?.show_help);
        assert!(parse_cli_args(vec!["--help"], default_options_path())?.show_help);
        Ok(())
    }
}
