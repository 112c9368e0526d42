use mazeball::app;

fn main() -> std::io::Result<()> {
    // The terminal is in raw mode and on the alternate screen while the game
    // runs, so logs go to a file instead of stdout.
    let file_appender = tracing_appender::rolling::never(".", "mazeball.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let mut stdout = std::io::stdout();
    app::setup_terminal(&mut stdout)?;
    let result = app::game::run(&mut stdout);
    // Restore the terminal even when the game exits with an error
    app::restore_terminal(&mut stdout)?;
    result
}
