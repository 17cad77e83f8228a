use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = genparse::cli::Cli::parse();
    genparse::init(cli.verbose);

    genparse::cli::run(cli)
}
