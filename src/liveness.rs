use axum::routing::get;

/// The hosting platform only checks that something answers on `/`.
pub fn init(brand: &str) -> axum::Router {
    let ack = acknowledgement(brand);
    axum::Router::new()
        .route("/", get(move || async move { ack }))
}

fn acknowledgement(brand: &str) -> String {
    format!("{brand} bot is running...")
}

#[cfg(test)]
mod tests {
    use super::acknowledgement;

    #[test]
    fn test_acknowledgement() {
        assert_eq!(acknowledgement("Afrowrld"), "Afrowrld bot is running...");
    }
}
