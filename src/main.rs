#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

mod interrupts;
mod vga_buffer;

use bootloader::{entry_point, BootInfo};
use cinser::{keyboard, time, Config};
use core::panic::PanicInfo;

entry_point!(kernel_main);

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    println!("{}", info);
    cinser::hlt_loop();
}

fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    vga_buffer::init_logger();
    println!("Tervia Cinser");
    println!("An x86 operating system\n");

    interrupts::init_idt();

    // PIC, registry, keyboard and clock all come up masked/quiet; nothing
    // fires until interrupts are enabled below.
    cinser::init(&Config::default());
    x86_64::instructions::interrupts::enable();
    log::info!("Interrupts enabled");

    print!("> ");

    // Main event loop - drain the keyboard, redraw the clock once per second
    loop {
        while let Some(byte) = keyboard::get_char() {
            vga_buffer::echo(byte);
            if byte == b'\n' {
                print!("> ");
            }
        }

        if time::has_update() {
            vga_buffer::show_status(time::formatted_string().as_bytes());
            time::consume_update();
        }

        x86_64::instructions::hlt();
    }
}
