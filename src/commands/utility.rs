//! Utility command handlers.

use ipac_hid::DeviceCatalog;

use super::CommandResult;

/// List all matching HID interfaces
pub fn list(vendor_id: u16) -> CommandResult {
    let catalog = DeviceCatalog::new(vendor_id)?;
    let interfaces = catalog.interfaces();

    if interfaces.is_empty() {
        println!("No HID interfaces matching vendor id 0x{vendor_id:04x}");
        return Ok(());
    }

    println!(
        "Found {} HID interface(s) for vendor id 0x{vendor_id:04x}:",
        interfaces.len()
    );
    for info in &interfaces {
        println!(
            "  {:<20} {:<8} VID={:04x} PID={:04x} page={:#06x} usage={:#04x} if={} product={}",
            info.label(),
            info.class(),
            info.vendor_id,
            info.product_id,
            info.usage_page,
            info.usage,
            info.interface_number,
            info.product.as_deref().unwrap_or("<unknown>"),
        );
        println!("    path: {}", info.path.to_string_lossy());
    }
    Ok(())
}
