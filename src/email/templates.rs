use crate::models::LeadRecord;

pub fn render_lead_subject(record: &LeadRecord, source: &str) -> String {
    format!("New lead for {source}: {}", record.name)
}

pub fn render_lead_notification(record: &LeadRecord, source: &str) -> String {
    let social = if record.social.is_empty() {
        "-"
    } else {
        record.social.as_str()
    };

    format!(
        "A new lead came in through the {source} contact form.\n\n\
         Name:    {name}\n\
         Phone:   {phone}\n\
         Social:  {social}\n\
         Course:  {course}\n\
         Received: {received}\n\
         Lead ID: {id}\n",
        name = record.name,
        phone = record.phone,
        course = record.course,
        received = record.created_at.to_rfc3339(),
        id = record.id,
    )
}
