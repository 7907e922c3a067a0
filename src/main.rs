use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use fireworks::{Color, FireworkVariant, Simulation, SimulationBuilder};
use std::env;
use std::fs::File;
use std::io::{BufWriter, stdout};
use std::str::FromStr;
use std::time::{Duration, Instant};

mod canvas;
use canvas::TerminalCanvas;

fn print_usage() {
    eprintln!("fireworks - Terminal fireworks display");
    eprintln!();
    eprintln!("Usage: fireworks [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --width PX         Virtual canvas width (default 800)");
    eprintln!("  --height PX        Virtual canvas height (default 600)");
    eprintln!("  --fps N            Simulation frame rate (default 60)");
    eprintln!("  --interval SECS    Base seconds between launches (default 3.0)");
    eprintln!("  --batch N          Fireworks per launch (default 3)");
    eprintln!("  --angle MIN:MAX    Launch bearing range in degrees (default 60:120)");
    eprintln!("  --seed N           Seed for a reproducible show");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --log-file PATH    Write logs to PATH (level from RUST_LOG, default info)");
    eprintln!();
    eprintln!("Keys: space = pause/resume, l = launch now, 1-6 = queue strobe/sparkle/small/medium/large/double");
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

fn run(mut sim: Simulation, bg_color: Color) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(cols as usize, rows as usize, sim.viewport(), bg_color);

    let fixed_dt = sim.config().timestep();
    let batch = sim.config().max_batch_size;
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f64;

    sim.start();

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key_event) => match key_event.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key_event.modifiers.contains(event::KeyModifiers::CONTROL) => {
                        break;
                    }
                    KeyCode::Char(' ') => {
                        if sim.is_running() {
                            sim.stop();
                        } else {
                            sim.start();
                        }
                    }
                    KeyCode::Char('l') => sim.launch_batch(batch),
                    KeyCode::Char(c @ '1'..='6') => {
                        let variant = FireworkVariant::ALL[c as usize - '1' as usize];
                        let id = sim.queue_firework(variant);
                        log::info!("queued {variant} firework {id}");
                    }
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    canvas = TerminalCanvas::new(cols as usize, rows as usize, sim.viewport(), bg_color);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > fixed_dt * 3.0 {
            accumulator = fixed_dt * 3.0;
        }

        while accumulator >= fixed_dt {
            sim.advance();
            accumulator -= fixed_dt;
        }

        canvas.clear();
        sim.draw(&mut canvas);
        canvas.render(&mut stdout)?;
    }

    sim.stop();
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color(r, g, b))
}

fn parse_angle_range(text: &str) -> Option<(f64, f64)> {
    let (min, max) = text.split_once(':')?;
    Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!();
    print_usage();
    std::process::exit(1);
}

fn flag_value<'a>(args: &'a [String], i: usize) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value,
        None => fail(&format!("{} requires a value", args[i])),
    }
}

fn parse_flag<T: FromStr>(args: &[String], i: usize) -> T {
    let value = flag_value(args, i);
    value
        .parse()
        .unwrap_or_else(|_| fail(&format!("Invalid value for {}: {}", args[i], value)))
}

fn init_logging(path: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut builder = SimulationBuilder::new();
    let mut bg_color = Color(0, 0, 0);
    let mut log_file: Option<String> = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => builder = builder.width(parse_flag(&args, i)),
            "--height" => builder = builder.height(parse_flag(&args, i)),
            "--fps" => builder = builder.frame_rate(parse_flag(&args, i)),
            "--interval" => builder = builder.seconds_between_launches(parse_flag(&args, i)),
            "--batch" => builder = builder.max_batch_size(parse_flag(&args, i)),
            "--seed" => builder = builder.seed(parse_flag(&args, i)),
            "--angle" => {
                let value = flag_value(&args, i);
                let Some((min, max)) = parse_angle_range(value) else {
                    fail(&format!("Invalid angle range: {}\nExpected format: MIN:MAX (e.g., 60:120)", value));
                };
                builder = builder.launch_angle_degrees(min, max);
            }
            "--bg-color" => {
                let value = flag_value(&args, i);
                match parse_hex_color(value) {
                    Some(color) => bg_color = color,
                    None => fail(&format!("Invalid hex color: {}\nExpected format: RRGGBB (e.g., 1a1b26)", value)),
                }
            }
            "--log-file" => log_file = Some(flag_value(&args, i).to_string()),
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => fail(&format!("Unknown option: {}", arg)),
        }
        i += 2;
    }

    if let Some(path) = &log_file {
        init_logging(path)?;
    }

    let sim = match builder.build() {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    run(sim, bg_color)
}
