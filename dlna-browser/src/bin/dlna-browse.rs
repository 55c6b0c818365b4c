//! Line-oriented front-end for browsing DLNA media servers
//!
//! Run with `DLNA_LOG_MODE=development` to see discovery and SOAP logs on
//! stderr.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dlna_browser::{
    init_logging_from_env, Activation, BackOutcome, BrowserConfig, BrowserError, MediaBrowser,
    Mode, Selection, Tab,
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

const HELP: &str = "\
Commands:
  servers        show the server tab (device list or current directory)
  renderers      show the renderer tab
  open N         select row N in the current tab
  renderer N     select renderer N for playback
  back           go up one directory
  ls             show the current tab again
  search         search the network again
  vol +|-        change the selected renderer's volume
  pause          pause the selected renderer
  stop           stop the selected renderer
  help           show this text
  quit           exit";

enum Command {
    Show(Tab),
    Open(usize),
    Renderer(usize),
    Back,
    List,
    Search,
    Volume(bool),
    Pause,
    Stop,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let argument = words.next();

    let index = |argument: Option<&str>| -> Result<usize, String> {
        argument
            .ok_or_else(|| format!("'{}' needs a row number", command))?
            .parse()
            .map_err(|_| format!("'{}' is not a row number", argument.unwrap_or_default()))
    };

    match command {
        "servers" => Ok(Command::Show(Tab::Servers)),
        "renderers" => Ok(Command::Show(Tab::Renderers)),
        "open" => index(argument).map(Command::Open),
        "renderer" => index(argument).map(Command::Renderer),
        "back" => Ok(Command::Back),
        "ls" | "" => Ok(Command::List),
        "search" => Ok(Command::Search),
        "vol" => match argument {
            Some("+") => Ok(Command::Volume(true)),
            Some("-") => Ok(Command::Volume(false)),
            _ => Err("usage: vol +|-".to_string()),
        },
        "pause" => Ok(Command::Pause),
        "stop" => Ok(Command::Stop),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{}', try 'help'", other)),
    }
}

fn print_tab(browser: &MediaBrowser, tab: Tab) {
    match tab {
        Tab::Servers if browser.navigation().mode() == Mode::Browsing => {
            let path: Vec<&str> = browser.navigation().stack().iter().map(|id| id.as_str()).collect();
            let device = browser
                .navigation()
                .current_device()
                .map(|device| device.name.as_str())
                .unwrap_or_default();
            println!("[{}] /{}", device, path.join("/"));
        }
        Tab::Servers => println!("Media servers:"),
        Tab::Renderers => match browser.selected_renderer() {
            Some(renderer) => println!("Media renderers (playing on {}):", renderer.name),
            None => println!("Media renderers (none selected):"),
        },
    }

    let rows = browser.rows(tab);
    if rows.is_empty() {
        println!("  (empty)");
    }
    for (index, (name, _icon)) in rows.iter().enumerate() {
        println!("  {:>3}  {}", index, name);
    }
}

fn execute(browser: &mut MediaBrowser, command: Command) -> Result<bool, BrowserError> {
    match command {
        Command::Show(tab) => {
            browser.set_active_tab(tab);
            print_tab(browser, tab);
        }
        Command::Open(index) => match browser.select(browser.active_tab(), index)? {
            Activation::Browsing(device) => println!("Browsing {}", device.name),
            Activation::Navigated(Selection::Opened(directory)) => println!("Opening {}", directory),
            Activation::Navigated(Selection::Played {
                start_index,
                playlist_len,
            }) => {
                println!("Playing item {} of {}", start_index + 1, playlist_len);
                if browser.has_pending_playback() {
                    println!("Pick a renderer with `renderer N` to start playback");
                }
                print_tab(browser, Tab::Renderers);
            }
            Activation::RendererSelected(device) => println!("Renderer: {}", device.name),
        },
        Command::Renderer(index) => {
            if let Activation::RendererSelected(device) = browser.select(Tab::Renderers, index)? {
                println!("Renderer: {}", device.name);
            }
        }
        Command::Back => {
            if browser.back() == BackOutcome::NotHandled {
                println!("Nothing to go back to");
            }
        }
        Command::List => print_tab(browser, browser.active_tab()),
        Command::Search => {
            browser.search();
            println!("Searching...");
        }
        Command::Volume(up) => browser.change_volume(up)?,
        Command::Pause => browser.pause()?,
        Command::Stop => browser.stop()?,
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if sender.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        eprintln!("Failed to read input: {}", e);
    }
    receiver
}

fn run() -> Result<(), BrowserError> {
    init_logging_from_env()?;
    let config = BrowserConfig::load()?;
    let mut browser = MediaBrowser::start(config)?;
    let lines = spawn_stdin_reader();

    println!("Searching for media servers and renderers. Type 'help' for commands.");
    prompt();

    loop {
        for notice in browser.wait_pending(POLL_INTERVAL) {
            eprintln!("! {}", notice);
        }

        match lines.try_recv() {
            Ok(line) => {
                match parse_command(&line) {
                    Ok(command) => match execute(&mut browser, command) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("! {}", e),
                    },
                    Err(message) => eprintln!("! {}", message),
                }
                prompt();
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("dlna-browse: {}", e);
        std::process::exit(1);
    }
}
