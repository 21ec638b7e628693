// Resume extraction prompt sent alongside every uploaded file.

pub const RESUME_EXTRACTION_PROMPT: &str = r#"
Extract the following information from the attached resume and return it as a **valid JSON object**.
**Do not include any text before or after the JSON object.**

The JSON should have the following structure:

- name: string
- contact: object with the following properties:
  - email: string
  - phone: string
  - linkedin: string
  - github: string
- summary: string
- work_experience: array of objects, each with:
  - company: string
  - role: string
  - duration: string
- education: array of objects, each with:
  - degree: string
  - university: string
  - graduation_year: string
- skills: array of strings
"#;
