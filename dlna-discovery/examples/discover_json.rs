//! Print discovered media servers and renderers as JSON

use dlna_discovery::{get_iter, DeviceEvent};

fn main() {
    for event in get_iter() {
        match event {
            DeviceEvent::Found(device) => match serde_json::to_string_pretty(&device) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize {}: {}", device.name, e),
            },
            DeviceEvent::Failed { location, error } => {
                eprintln!("Skipping {}: {}", location, error);
            }
        }
    }
}
