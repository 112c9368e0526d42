pub mod game;

use std::io::{Stdout, Write};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, StyledContent, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::maze::cell::GridCell;

/// Terminal rows reserved below the maze for status messages.
pub(crate) const NUM_LOG_ROWS: u16 = 2;

/// Set a panic hook to restore terminal state on panic
/// This ensures that the terminal is not left in raw mode or alternate screen on panic
/// even if the panic occurs in a different thread
fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
        hook(panic_info);
    }));
}

/// Setup terminal in raw mode and enter alternate screen
/// Also sets a panic hook to restore terminal on panic
pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
    terminal::enable_raw_mode()?;
    set_panic_hook();
    crossterm::queue!(
        stdout,
        terminal::EnterAlternateScreen,
        terminal::Clear(ClearType::All),
        cursor::Hide,
        cursor::MoveTo(0, 0)
    )?;
    stdout.flush()?;
    Ok(())
}

/// Restore terminal to original state
/// Leave alternate screen and disable raw mode
pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
    queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
    stdout.flush()?;
    terminal::disable_raw_mode()?;
    Ok(())
}

/// Print a status message on the log row below the maze, clearing whatever was
/// there before. `None` just clears the row. The message is clipped to the
/// terminal width so a long message never wraps into the maze.
pub(crate) fn log_terminal<D: std::fmt::Display>(
    stdout: &mut impl Write,
    board_height: u16,
    msg: Option<StyledContent<D>>,
) -> std::io::Result<()> {
    queue!(
        stdout,
        cursor::MoveTo(0, board_height),
        terminal::Clear(ClearType::CurrentLine)
    )?;
    if let Some(msg) = msg {
        let term_width = terminal::size()
            .map(|(width, _)| width as usize)
            .unwrap_or(usize::MAX);
        let text = msg.content().to_string();
        let (clipped, _) = text.unicode_truncate(term_width);
        stdout.queue(style::PrintStyledContent(StyledContent::new(
            *msg.style(),
            clipped,
        )))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Get user input with real-time validation and feedback
/// Returns None if user cancels input with Esc
/// Returns Some(T) if user inputs a valid input and presses Enter, where T is the validated type
fn prompt_with_validation<F, T>(
    stdout: &mut Stdout,
    prompt: &str,
    validate: F,
) -> std::io::Result<Option<T>>
where
    F: Fn(&str) -> Result<T, String>,
{
    // Save cursor position so we can restore / redraw
    queue!(stdout, cursor::Hide, cursor::SavePosition)?;
    stdout.flush()?;

    let mut input = String::new();

    let number_option = loop {
        // Re-render prompt line
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown)
        )?;

        // Print prompt
        stdout.queue(style::PrintStyledContent(
            prompt.with(Color::Cyan).attribute(Attribute::Bold),
        ))?;

        // Decide color based on validity
        let validation_result = validate(input.trim());
        match validation_result {
            Ok(_) => {
                stdout.queue(style::SetForegroundColor(Color::Green))?;
            }
            Err(_) => {
                stdout.queue(style::SetForegroundColor(Color::Red))?;
            }
        }

        queue!(stdout, style::Print(&input), style::ResetColor)?;

        stdout.queue(style::Print(" \r\n"))?;

        // Error message line (if any)
        if let Err(msg) = validation_result {
            stdout.queue(style::PrintStyledContent(
                msg.with(Color::DarkGrey).attribute(Attribute::Dim),
            ))?;
        }

        stdout.flush()?;

        // Wait for key event
        if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
            match code {
                KeyCode::Enter => {
                    match validate(&input) {
                        Ok(n) => break Some(n), // valid number, exit loop
                        Err(_) => continue,     // invalid, re-render
                    }
                }
                KeyCode::Char(c) if kind == event::KeyEventKind::Press => {
                    if !c.is_whitespace() && !c.is_control() {
                        input.push(c);
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Esc => {
                    // User cancelled input
                    break None;
                }
                _ => {}
            }
        }
    };
    // Cleanup
    queue!(
        stdout,
        cursor::RestorePosition,
        terminal::Clear(ClearType::FromCursorDown),
        cursor::Show
    )?;
    stdout.flush()?;

    Ok(number_option)
}

/// Calculate max maze size based on terminal size and cell size
/// Ensures the size is odd and at least 3
fn get_max_maze_size(term_size: u16, cell_size: u16) -> u8 {
    // Get default grid dimension based on terminal size. Make sure they are odd and at least 3.
    let odd_and_min_3 = |n: u16| if n % 2 == 0 && n > 0 { n - 1 } else { n }.max(3);
    let max_grid_size = odd_and_min_3(term_size / cell_size);

    // Default maze dimensions are half the grid dimensions, capped at u8::MAX
    (max_grid_size / 2).min(u8::MAX as u16) as u8
}

/// Ask user for maze dimensions (width and height between 1 and 255)
/// Returns None if user cancels input with Esc
/// Returns Some((rows, columns)) if user inputs valid dimensions
pub(crate) fn ask_maze_dimensions(stdout: &mut Stdout) -> std::io::Result<Option<(u8, u8)>> {
    stdout.execute(style::PrintStyledContent(
        "Enter maze dimensions (width and height between 1 and 255), or press Esc to exit. \
Maximum acceptable values are based on current terminal size. \
Leave a field empty to take the maximum.\r\n"
            .with(Color::Blue),
    ))?;

    // Validation closure based on default sizes
    let validate = |s: &str, is_width| {
        let max_size = if let Ok((term_width, term_height)) = terminal::size() {
            if is_width {
                get_max_maze_size(term_width, GridCell::CELL_WIDTH)
            } else {
                // Reserve rows for the status line
                get_max_maze_size(term_height.saturating_sub(NUM_LOG_ROWS), 1)
            }
        } else {
            // Fallback to max size if terminal size cannot be determined
            u8::MAX
        };

        if s.trim().is_empty() {
            return Ok(max_size);
        }

        let error_msg = format!("Please enter a valid number between 1 and {}.", max_size);
        s.parse::<u8>()
            .map_err(|_| error_msg.clone())
            .and_then(|n| match n {
                1..=255 if n <= max_size => Ok(n),
                _ => Err(error_msg),
            })
    };

    let validate_width = |s: &str| validate(s, true);
    let validate_height = |s: &str| validate(s, false);

    let columns = match prompt_with_validation(stdout, "Width: ", validate_width)? {
        Some(w) => w,
        None => return Ok(None),
    };
    stdout.execute(style::PrintStyledContent(
        format!("Width set to {}\r\n", columns)
            .with(Color::Green)
            .attribute(Attribute::Bold),
    ))?;

    let rows = match prompt_with_validation(stdout, "Height: ", validate_height)? {
        Some(h) => h,
        None => return Ok(None),
    };
    stdout.execute(style::PrintStyledContent(
        format!("Height set to {}\r\n", rows)
            .with(Color::Green)
            .attribute(Attribute::Bold),
    ))?;

    Ok(Some((rows, columns)))
}
