use std::env;
use std::process;

use wsprbeacon::{encode, u4b};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} encode <callsign> <grid4> <power_dbm>");
    eprintln!("       {program} decode <pseudo-callsign> <grid4> <power_dbm>");
    process::exit(1);
}

fn main() {
    wsprbeacon::tracing_init::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        usage(&args[0]);
    }

    let power: u8 = match args[4].parse() {
        Ok(p) => p,
        Err(_) => {
            eprintln!("power must be an integer dBm value");
            process::exit(1);
        }
    };

    match args[1].as_str() {
        "encode" => match encode(&args[2], &args[3], power) {
            Ok(message) => {
                println!("Message: {}", message.display_string);
                let symbols: String =
                    message.symbols.iter().map(|s| (s + b'0') as char).collect();
                println!("Channel Symbols: {symbols}");
            }
            Err(e) => {
                eprintln!("encode failed: {e}");
                process::exit(1);
            }
        },
        "decode" => match u4b::decode(&args[2], &args[3], power) {
            Ok(telemetry) => {
                println!("Channel:     {}", telemetry.channel);
                println!("Subsquare:   {}", telemetry.subsquare);
                println!("Altitude:    {} m", telemetry.altitude_m);
                println!("Temperature: {} C", telemetry.temperature_c);
                println!("Voltage:     {:.2} V", telemetry.voltage);
                println!("Speed:       {} kn", telemetry.speed_kn);
                println!("GPS valid:   {}", telemetry.gps_valid);
                println!("GPS health:  {}", telemetry.gps_health);
            }
            Err(e) => {
                eprintln!("decode failed: {e}");
                process::exit(1);
            }
        },
        _ => usage(&args[0]),
    }
}
