//! Demo application on a simulated board

use anyhow::{bail, Context, Result};
use devboard_app::{DevBoard, EchoSummary};
use devboard_core::config::BoardConfig;
use devboard_core::{RegisterName, UartPort};
use devboard_hal::NoDelay;
use devboard_sim::SimBoard;
use tracing::info;

/// Receive FIFO depth of the simulated UART
const RX_FIFO_DEPTH: usize = 16;

/// Longest line `serial_echo` accepts
const MAX_LINE: usize = 64;

/// What to feed the simulated board
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// LCD line 1
    pub first: String,
    /// LCD line 2
    pub second: String,
    /// Line typed into the first serial port, if any
    pub serial_input: Option<String>,
    /// Button register values, one per poll
    pub buttons: Vec<u16>,
    /// Poll limit of the button echo
    pub max_polls: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            first: String::from("Hello World"),
            second: String::from("Second Line"),
            serial_input: None,
            buttons: Vec::new(),
            max_polls: 64,
        }
    }
}

/// Board state after the demos ran
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// What each LCD line shows
    pub lcd_lines: Vec<String>,
    /// Every LED pattern written
    pub led_history: Vec<u32>,
    /// Bytes sent on the first serial port
    pub serial_output: Vec<u8>,
    /// LED animation frames
    pub frames: u32,
    /// Button echo outcome
    pub echo: EchoSummary,
    /// Total bus transactions
    pub bus_accesses: usize,
    /// Accesses outside the register map
    pub faults: usize,
}

/// Run the showcase, a serial echo and a button echo session
pub fn run(config: &BoardConfig, options: &SimulationOptions) -> Result<SimulationReport> {
    let sim = SimBoard::new(config.clone());
    let mut board = DevBoard::new(config, &sim, NoDelay);

    info!("running showcase on {}", config.name);
    let frames = board
        .showcase(&options.first, &options.second)
        .context("Showcase failed")?;

    if let Some(input) = &options.serial_input {
        if board.uart().is_none() {
            bail!("Board '{}' has no serial port", config.name);
        }
        let mut line = input.trim_end_matches(['\r', '\n']).as_bytes().to_vec();
        line.push(b'\n');
        if line.len() > RX_FIFO_DEPTH {
            bail!(
                "Serial input must fit the {}-byte receive FIFO, got {} bytes",
                RX_FIFO_DEPTH,
                line.len()
            );
        }
        sim.send_to_uart(UartPort::Uart0, &line);
        let echoed = board
            .serial_echo::<MAX_LINE>()
            .context("Serial echo failed")?;
        info!("echoed {} bytes", echoed.len());
    }

    let patterns: Vec<u32> = options.buttons.iter().map(|&b| b as u32).collect();
    sim.script_buttons(&patterns);
    let echo = board
        .button_echo(Some(options.max_polls))
        .context("Button echo failed")?;
    info!(
        "button echo: {} polls, exited = {}",
        echo.polls, echo.exited
    );

    let lcd_lines = {
        let lcd = sim.lcd();
        (0..config.lcd.geometry.lines)
            .map(|row| lcd.visible_line(row))
            .collect()
    };
    let serial_output = if config.map.contains(RegisterName::Uart0Data) {
        sim.take_uart_output(UartPort::Uart0)
    } else {
        Vec::new()
    };

    Ok(SimulationReport {
        lcd_lines,
        led_history: sim.led_history(),
        serial_output,
        frames,
        echo,
        bus_accesses: sim.log().len(),
        faults: sim.faults().len(),
    })
}
