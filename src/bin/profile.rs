use mazeball::carver;

fn main() -> std::io::Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);

    for _ in 0..num_iters {
        carver::generate(u8::MAX, u8::MAX, None).map_err(std::io::Error::other)?;
    }
    Ok(())
}
