use colored::*;

use super::formatters::{format_bytes, format_load, format_percent, format_rate, format_temperature};
use crate::core::system_monitor::{ProcessInfo, Sample, SensorTreeStatus};

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

pub fn format_sample(sample: &Sample) {
    println!("\n{}", "HOST METRICS".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    print_section_header("CPU");
    println!("  Model: {}", sample.cpu.name);
    println!("  Logical processors: {}", sample.cpu.logical_processor_count);
    println!("  Usage: {}", format_load(sample.cpu.usage_percent));
    println!(
        "  Temperature: {}",
        format_temperature(sample.cpu.temperature_celsius)
    );

    print_section_header("Memory");
    println!(
        "  Used: {} / {} ({})",
        format_bytes(sample.memory.used_bytes),
        format_bytes(sample.memory.total_bytes),
        format_load(sample.memory.usage_percent)
    );
    println!("  Available: {}", format_bytes(sample.memory.available_bytes));

    print_section_header("GPU");
    for (index, gpu) in sample.gpus.iter().enumerate() {
        if gpu.is_unavailable() {
            println!("  {}", "No graphics device detected".dimmed());
            continue;
        }
        println!("  [{}] {}", index, gpu.name.bold());
        println!("      Usage: {}", format_load(gpu.usage_percent));
        println!(
            "      Temperature: {}",
            format_temperature(gpu.temperature_celsius)
        );
        if gpu.vram_total_bytes > 0 {
            println!(
                "      VRAM: {} / {}",
                format_bytes(gpu.vram_used_bytes),
                format_bytes(gpu.vram_total_bytes)
            );
        }
    }

    print_section_header("Disk");
    println!(
        "  Read: {}   Write: {}",
        format_rate(sample.disk.read_bytes_per_second),
        format_rate(sample.disk.write_bytes_per_second)
    );
    println!(
        "  Capacity: {} / {} ({})",
        format_bytes(sample.disk.used_bytes),
        format_bytes(sample.disk.total_bytes),
        format_percent(sample.disk.usage_percent)
    );

    print_section_header("Network");
    println!(
        "  Download: {}   Upload: {}",
        format_rate(sample.network.download_bytes_per_second),
        format_rate(sample.network.upload_bytes_per_second)
    );
    println!(
        "  Total: {} received, {} sent",
        format_bytes(sample.network.total_bytes_received),
        format_bytes(sample.network.total_bytes_sent)
    );
    println!();
}

pub fn format_sensor_status(endpoint: &str, status: &SensorTreeStatus, keys: &[String]) {
    print_section_header("Sensor tree");
    println!("  Endpoint: {}", endpoint);

    let reachable = if status.reachable {
        "yes".green()
    } else {
        "no".red()
    };
    let http = if status.http_ok { "ok".green() } else { "failed".red() };
    println!("  Temperatures parsed: {}", reachable);
    println!("  HTTP: {}", http);
    println!("  CPU: {}", format_temperature(status.cpu_temp));
    println!("  GPU: {}", format_temperature(status.gpu_temp));
    match status.gpu_load {
        Some(load) => println!("  GPU load: {}", format_load(load)),
        None => println!("  GPU load: {}", "N/A".dimmed()),
    }
    if let Some(error) = &status.error {
        println!("  Last error: {}", error.yellow());
    }
    println!("  Top-level keys: {}", keys.join(", "));
}

pub fn format_processes(processes: &[ProcessInfo]) {
    if processes.is_empty() {
        println!("{}", "No processes found".dimmed());
        return;
    }

    println!(
        "{:>8}  {:<32} {:>7} {:>12} {:>12} {:>12}",
        "PID".bold(),
        "NAME".bold(),
        "CPU".bold(),
        "MEMORY".bold(),
        "READ".bold(),
        "WRITTEN".bold()
    );

    for process in processes {
        let name: String = process.name.chars().take(32).collect();
        println!(
            "{:>8}  {:<32} {:>7} {:>12} {:>12} {:>12}",
            process.pid,
            name,
            format_percent(process.cpu_percent),
            format_bytes(process.memory_bytes),
            format_bytes(process.disk_read_bytes),
            format_bytes(process.disk_write_bytes)
        );
    }
}
