use crate::{db_types::Registration, helpers::title_case, notifications::MailMessage};

pub const CONFIRMATION_SUBJECT: &str = "Welcome to Discovery ADCET 2025 🎉";

/// Minimal HTML escaping for values interpolated into the mail body.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Builds the welcome mail sent to the team leader once their registration is stored.
pub fn confirmation_message(registration: &Registration) -> MailMessage {
    let name = escape_html(&title_case(&registration.leader_name));
    let event = escape_html(&title_case(&registration.selected_event));
    let college = escape_html(&title_case(&registration.leader_college));
    let year = escape_html(&registration.leader_year);
    let phone = escape_html(&registration.leader_mobile);
    let id = registration.registration_id;
    let html_body = format!(
        r#"<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta content="width=device-width, initial-scale=1.0" name="viewport">
  <title>Welcome to Discovery ADCET 2025!</title>
  <style>
    body {{ margin: 0; padding: 40px 20px; background: #1e40af; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; }}
    .container {{ max-width: 640px; margin: auto; background: #ffffff; border-radius: 16px; padding: 30px; }}
    .banner {{ background: #667eea; color: white; text-align: center; padding: 20px; border-radius: 12px; font-size: 28px; font-weight: bold; }}
    .content {{ color: #333; line-height: 1.6; font-size: 16px; }}
    .highlight-card {{ background: #f5576c; color: white; padding: 15px; border-radius: 10px; margin: 15px 0; }}
    .footer {{ text-align: center; margin-top: 30px; color: #666; font-size: 14px; border-top: 1px solid #ddd; padding-top: 20px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="banner">Discovery ADCET 2025: Welcome Onboard! 🎉</div>
    <div class="content">
      Hello <strong>{name}</strong>,
      <br><br>
      You've successfully registered for <strong>{event}</strong> as part of <strong>Discovery ADCET 2025</strong>!
      We're super excited to have you onboard. 🚀
      <br><br>
      Here's your registration summary:
      <div class="highlight-card">
        <strong>Registration ID:</strong> {id}<br>
        <strong>College:</strong> {college}<br>
        <strong>Year of Study:</strong> {year}<br>
        <strong>Phone Number:</strong> {phone}<br>
      </div>
      🔔 Stay tuned for further updates, schedules, and announcements via email and our official page.
    </div>
    <div class="footer">
      Have questions? Just reply to this email. 💬<br>
      We'll see you at the event. Team Discovery ADCET 🌟✨
    </div>
  </div>
</body>
</html>"#
    );
    MailMessage { to: registration.leader_email.clone(), subject: CONFIRMATION_SUBJECT.to_string(), html_body }
}
