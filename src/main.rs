mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command, GenerateArgs, LaunchArgs};
use hollowtext::error::LaunchError;
use hollowtext::launch::ExternalGenerator;
use hollowtext::pipeline::TextToStl;
use hollowtext::HollowTextError;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::WARN.into())
        .add_directive("hollowtext=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => generate(&args),
        Command::Launch(args) => launch(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(args: &GenerateArgs) -> hollowtext::Result<()> {
    let output = args.output_path();
    let report = TextToStl::new(args.params()).execute(&args.text, &args.font, &output)?;
    println!(
        "{}: {} glyph regions built, {} skipped, {} triangles",
        output.display(),
        report.built,
        report.skipped.len(),
        report.mesh.triangle_count()
    );
    for skipped in &report.skipped {
        println!("  region {} skipped: {}", skipped.index, skipped.reason);
    }
    Ok(())
}

fn launch(args: &LaunchArgs) -> hollowtext::Result<()> {
    let generator = if args.program == "blender" {
        ExternalGenerator::blender(&args.script)
    } else {
        ExternalGenerator::new(&args.program, [args.script.as_os_str()])
    };
    let result = generator.execute(&args.text, args.font.as_deref(), args.glyph_count);
    if let Err(HollowTextError::Launch(LaunchError::Failed { stdout, stderr, .. })) = &result {
        print!("{stdout}");
        eprint!("{stderr}");
    }
    let out = result?;
    print!("{}", out.stdout);
    eprint!("{}", out.stderr);
    Ok(())
}
