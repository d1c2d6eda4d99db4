use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

use cinser::constants::interrupts::{PIC_1_OFFSET, PIC_2_OFFSET};
use cinser::irq::{self, InterruptContext};

/// Hardware interrupt numbers (after remapping)
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET,
    Keyboard,
    // PIC 1 (master) IRQs 2-7
    Cascade,
    COM2,
    COM1,
    LPT2,
    FloppyDisk,
    LPT1,
    // PIC 2 (slave) IRQs 8-15
    RTC = PIC_2_OFFSET,
    ACPI,
    Available1,
    Available2,
    Mouse,
    CoProcessor,
    PrimaryATA,
    SecondaryATA,
}

impl InterruptIndex {
    fn as_u8(self) -> u8 {
        self as u8
    }
}

// Each trampoline only knows its own vector; the registry does the rest.
macro_rules! irq_trampoline {
    ($name:ident, $index:expr) => {
        extern "x86-interrupt" fn $name(_stack_frame: InterruptStackFrame) {
            irq::dispatch(&InterruptContext::new($index.as_u8()));
        }
    };
}

irq_trampoline!(irq0, InterruptIndex::Timer);
irq_trampoline!(irq1, InterruptIndex::Keyboard);
irq_trampoline!(irq2, InterruptIndex::Cascade);
irq_trampoline!(irq3, InterruptIndex::COM2);
irq_trampoline!(irq4, InterruptIndex::COM1);
irq_trampoline!(irq5, InterruptIndex::LPT2);
irq_trampoline!(irq6, InterruptIndex::FloppyDisk);
irq_trampoline!(irq7, InterruptIndex::LPT1);
irq_trampoline!(irq8, InterruptIndex::RTC);
irq_trampoline!(irq9, InterruptIndex::ACPI);
irq_trampoline!(irq10, InterruptIndex::Available1);
irq_trampoline!(irq11, InterruptIndex::Available2);
irq_trampoline!(irq12, InterruptIndex::Mouse);
irq_trampoline!(irq13, InterruptIndex::CoProcessor);
irq_trampoline!(irq14, InterruptIndex::PrimaryATA);
irq_trampoline!(irq15, InterruptIndex::SecondaryATA);

type Trampoline = extern "x86-interrupt" fn(InterruptStackFrame);

const TRAMPOLINES: [(InterruptIndex, Trampoline); 16] = [
    (InterruptIndex::Timer, irq0),
    (InterruptIndex::Keyboard, irq1),
    (InterruptIndex::Cascade, irq2),
    (InterruptIndex::COM2, irq3),
    (InterruptIndex::COM1, irq4),
    (InterruptIndex::LPT2, irq5),
    (InterruptIndex::FloppyDisk, irq6),
    (InterruptIndex::LPT1, irq7),
    (InterruptIndex::RTC, irq8),
    (InterruptIndex::ACPI, irq9),
    (InterruptIndex::Available1, irq10),
    (InterruptIndex::Available2, irq11),
    (InterruptIndex::Mouse, irq12),
    (InterruptIndex::CoProcessor, irq13),
    (InterruptIndex::PrimaryATA, irq14),
    (InterruptIndex::SecondaryATA, irq15),
];

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        // CPU exceptions
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);

        // Every PIC line gets a trampoline so a stray IRQ is still acknowledged
        for (index, trampoline) in TRAMPOLINES {
            idt[index.as_u8()].set_handler_fn(trampoline);
        }

        idt
    };
}

pub fn init_idt() {
    IDT.load();
    log::debug!("IDT loaded, IRQ vectors {:#04x}-{:#04x}", PIC_1_OFFSET, PIC_2_OFFSET + 7);
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::warn!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}
