//! Cart output formatting.

use std::io::{self, Write};

use rocketshoes_core::Cart;

const TITLE_WIDTH: usize = 40;

/// Write the cart as a plain-text table.
pub fn table(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Carrinho vazio");
    }

    for item in cart {
        writeln!(
            out,
            "{:>5}  {:<width$}  {:>3} x {:>12}  {:>14}",
            item.id().as_i32(),
            truncate(&item.product.title, TITLE_WIDTH),
            item.amount,
            item.product.price.to_string(),
            item.subtotal().to_string(),
            width = TITLE_WIDTH,
        )?;
    }

    writeln!(
        out,
        "{} produtos, {} unidades. Total: {}",
        cart.len(),
        cart.total_quantity(),
        cart.total()
    )
}

/// Write the cart as the same JSON array that is persisted.
pub fn json(out: &mut impl Write, cart: &Cart) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut *out, cart)?;
    writeln!(out).map_err(serde_json::Error::io)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
