//! Booking confirmation email.

use chrono::NaiveDateTime;

/// Subject line of the confirmation sent to the client.
pub fn confirmation_subject(professional: &str) -> String {
    format!("Reserva confirmada con {}", professional)
}

/// HTML body of the confirmation. The Meet paragraph is omitted when no link exists.
pub fn confirmation_body(
    client_name: &str,
    professional: &str,
    start_at: &NaiveDateTime,
    meeting_link: Option<&str>,
) -> String {
    let mut body = format!(
        "<p>Hola {},</p>\n<p>Tu reserva con {} ha sido confirmada para <strong>{}</strong>.</p>\n",
        escape_html(client_name),
        escape_html(professional),
        start_at.format("%d-%m-%Y %H:%M")
    );

    if let Some(link) = meeting_link {
        let link = escape_html(link);
        body.push_str("<p>Accede a la reunión de Google Meet usando este enlace:</p>\n");
        body.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>\n",
            link, link
        ));
    }

    body.push_str("<p>Gracias por confiar en nosotros.</p>");
    body
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_subject_names_professional() {
        assert_eq!(
            confirmation_subject("Dra. Ana Pérez"),
            "Reserva confirmada con Dra. Ana Pérez"
        );
    }

    #[test]
    fn test_body_with_meeting_link() {
        let body = confirmation_body(
            "Juan",
            "Dra. Ana Pérez",
            &start(),
            Some("https://meet.google.com/abc-defg-hij"),
        );
        assert!(body.contains("<p>Hola Juan,</p>"));
        assert!(body.contains("<strong>10-06-2024 09:00</strong>"));
        assert!(body.contains("href=\"https://meet.google.com/abc-defg-hij\""));
    }

    #[test]
    fn test_body_without_meeting_link() {
        let body = confirmation_body("Juan", "Dra. Ana Pérez", &start(), None);
        assert!(!body.contains("Google Meet"));
        assert!(body.ends_with("<p>Gracias por confiar en nosotros.</p>"));
    }

    #[test]
    fn test_client_input_is_escaped() {
        let body = confirmation_body("<script>alert('x')</script>", "Dr. A & B", &start(), None);
        assert!(body.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(body.contains("Dr. A &amp; B"));
        assert!(!body.contains("<script>"));
    }
}
