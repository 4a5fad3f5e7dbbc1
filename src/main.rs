use clap::Parser;

use casement::{ControlFlow, Event, EventLoop, WindowBuilder};

mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = cli::Cli::parse();

    let mut event_loop = EventLoop::new()?;
    let window = event_loop.create_window(
        WindowBuilder::new()
            .with_title(args.title.as_str())
            .with_dimensions(args.width, args.height)?,
    )?;

    println!(
        "window {:?}: {}x{} @ {}",
        window.id(),
        window.inner_size().width,
        window.inner_size().height,
        window.scale_factor()
    );

    let mut dispatches = 0u64;
    event_loop.run_with(&mut dispatches, |dispatches, event| {
        *dispatches += 1;
        match event {
            Event::CloseRequested { .. } => return ControlFlow::Exit,
            Event::Resized { size, .. } => {
                println!("resized: {}x{}", size.width, size.height);
            }
            Event::CursorMoved { x, y, .. } => {
                println!("cursor: {:.1}, {:.1}", x, y);
            }
            Event::ScaleFactorChanged {
                scale_factor, size, ..
            } => {
                println!(
                    "scale factor: {} ({}x{})",
                    scale_factor, size.width, size.height
                );
            }
            _ => {}
        }
        ControlFlow::Wait
    })?;

    if args.count_events {
        println!("dispatched {} events", dispatches);
    }
    Ok(())
}
