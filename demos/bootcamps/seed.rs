use serde_json::{Value, json};

pub fn bootcamps() -> Vec<Value> {
    vec![
        json!({
            "_id": "5d713995b721c3bb38c1f5d0",
            "name": "Devworks Bootcamp",
            "description": "Devworks is a full stack JavaScript Bootcamp located in the heart of Boston",
            "careers": ["Web Development", "UI/UX", "Business"],
            "location": {"city": "Boston", "state": "MA"},
            "averageCost": 10000,
            "housing": true,
            "jobAssistance": true,
            "jobGuarantee": false,
            "acceptGi": true,
        }),
        json!({
            "_id": "5d713a66ec8f2b88b8f830b8",
            "name": "ModernTech Bootcamp",
            "description": "ModernTech has one goal, and that is to make you a rockstar developer",
            "careers": ["Web Development", "UI/UX", "Mobile Development"],
            "location": {"city": "Kingston", "state": "VT"},
            "averageCost": 8000,
            "housing": false,
            "jobAssistance": true,
            "jobGuarantee": false,
            "acceptGi": true,
        }),
        json!({
            "_id": "5d725a037b292f5f8ceff787",
            "name": "Codemasters",
            "description": "Is coding your passion? Codemasters will give you the skills to excel",
            "careers": ["Web Development", "Data Science", "Business"],
            "location": {"city": "Burlington", "state": "VT"},
            "averageCost": 12000,
            "housing": false,
            "jobAssistance": false,
            "jobGuarantee": false,
            "acceptGi": false,
        }),
        json!({
            "_id": "5d725a1b7b292f5f8ceff788",
            "name": "Devcentral Bootcamp",
            "description": "Is coding your passion? Devcentral will give you the skills and tools to become a great developer",
            "careers": ["Mobile Development", "Web Development", "Data Science", "Business"],
            "location": {"city": "Providence", "state": "RI"},
            "averageCost": 9000,
            "housing": true,
            "jobAssistance": true,
            "jobGuarantee": true,
            "acceptGi": true,
        }),
    ]
}

pub fn courses() -> Vec<Value> {
    vec![
        json!({"title": "Front End Web Development", "weeks": "8", "tuition": 8000,
               "minimumSkill": "beginner", "scholarshipAvailable": true,
               "bootcamp": "5d713995b721c3bb38c1f5d0"}),
        json!({"title": "Full Stack Web Development", "weeks": "12", "tuition": 10000,
               "minimumSkill": "intermediate", "scholarshipAvailable": false,
               "bootcamp": "5d713995b721c3bb38c1f5d0"}),
        json!({"title": "Full Stack Web Dev", "weeks": "12", "tuition": 12000,
               "minimumSkill": "intermediate", "scholarshipAvailable": true,
               "bootcamp": "5d713a66ec8f2b88b8f830b8"}),
        json!({"title": "UI/UX", "weeks": "12", "tuition": 10000,
               "minimumSkill": "intermediate", "scholarshipAvailable": false,
               "bootcamp": "5d713a66ec8f2b88b8f830b8"}),
        json!({"title": "Web Design & Development", "weeks": "10", "tuition": 12000,
               "minimumSkill": "beginner", "scholarshipAvailable": true,
               "bootcamp": "5d725a037b292f5f8ceff787"}),
        json!({"title": "Data Science Program", "weeks": "10", "tuition": 12000,
               "minimumSkill": "intermediate", "scholarshipAvailable": false,
               "bootcamp": "5d725a037b292f5f8ceff787"}),
        json!({"title": "Mobile Development", "weeks": "12", "tuition": 11000,
               "minimumSkill": "intermediate", "scholarshipAvailable": false,
               "bootcamp": "5d725a1b7b292f5f8ceff788"}),
    ]
}

pub fn reviews() -> Vec<Value> {
    vec![
        json!({"title": "Learned a ton!", "text": "Great instructors and a solid curriculum.",
               "rating": 8, "bootcamp": "5d713995b721c3bb38c1f5d0"}),
        json!({"title": "Great bootcamp", "text": "Landed a job two months after finishing.",
               "rating": 10, "bootcamp": "5d713995b721c3bb38c1f5d0"}),
        json!({"title": "Got me a developer job", "text": "Hard work, but worth it.",
               "rating": 7, "bootcamp": "5d713a66ec8f2b88b8f830b8"}),
        json!({"title": "Not that great", "text": "The pace was too fast for me.",
               "rating": 4, "bootcamp": "5d725a037b292f5f8ceff787"}),
    ]
}

pub fn users() -> Vec<Value> {
    vec![
        json!({"name": "Admin Account", "email": "admin@gmail.com", "role": "admin"}),
        json!({"name": "Publisher Account", "email": "publisher@gmail.com", "role": "publisher"}),
        json!({"name": "User Account", "email": "user@gmail.com", "role": "user"}),
        json!({"name": "John Doe", "email": "john@gmail.com", "role": "publisher"}),
    ]
}
