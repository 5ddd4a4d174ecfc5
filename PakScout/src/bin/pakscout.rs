fn main() -> anyhow::Result<()> {
    pakscout::cli::run_cli()
}
