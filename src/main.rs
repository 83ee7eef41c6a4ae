//! Entry point banner for the arrow sight tools

fn main() {
    println!("Arrow Sight v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Computes archery sight-angle tables from a drag-aware arrow trajectory.");
    println!("The solver is available as the `arrow_sight` library crate.");
    println!();
    println!("To compute a sight table:");
    println!("  sight-cli sweep --output angles.txt");
    println!();
    println!("To lay out a printable sight tape from that table:");
    println!("  sight-cli tape --angles angles.txt --range-1 20 --range-2 60 --separation 1.25");
}
