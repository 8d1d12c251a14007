//! Fixed reply texts.

pub fn greeting(institution: &str) -> String {
    format!(
        "Hello! I'm the student helpdesk assistant for {institution}.\n\n\
I can help with:\n\
- **Fees**: structure, payment methods, installments\n\
- **MYSY scholarship**: eligibility and how to apply\n\
- **Attendance**: your percentage, eligibility and a plan for the rest of the term\n\
- **Academic calendar**: exam dates and term schedule\n\
- **Subjects and study material** for all 8 semesters\n\
- **Exams and grading**: grades for marks, SGPA, CGPA and percentage\n\
- **Re-assessment, library and discipline rules**\n\
- **Placements**: statistics, recruiters, training\n\n\
Type **help** for example questions."
    )
}

pub fn farewell(institution: &str) -> String {
    format!("Goodbye! All the best with your studies at {institution}. Come back any time.")
}

pub const HELP: &str = "**Things you can ask me:**\n\n\
**Attendance**\n\
  - 'My attendance is 45/60'\n\
  - 'I attended 12 of 15, 20 classes remaining, can I reach 80%?'\n\n\
**Grades and CGPA**\n\
  - 'What grade for 75 marks?'\n\
  - 'SGPA for 4 credits A, 3 credits O'\n\
  - 'CGPA for 8.5 with 20 credits and 9.1 with 22 credits'\n\
  - 'Convert 8.2 CGPA to percentage'\n\n\
**Fees and scholarship**\n\
  - 'What is the semester fee?'\n\
  - 'How do I apply for MYSY?'\n\n\
**Subjects and material**\n\
  - 'Semester 5 subjects'\n\
  - 'DBMS syllabus'\n\
  - 'Sem 4 study material link'\n\n\
**Other**\n\
  - 'When is the mid-sem exam?'\n\
  - 'Re-assessment fee', 'Library fine', 'Dress code', 'Placement statistics'";

pub fn unknown(institution: &str) -> String {
    format!(
        "I'm not sure I understood that. Could you rephrase it?\n\n\
I can answer questions about **fees, attendance, scholarships, exam dates, subjects, study material, \
grading, re-assessment, library rules, discipline and placements**.\n\n\
Type **help** for examples, or contact the {institution} office for anything else."
    )
}

pub const ATTENDANCE_PROMPT: &str = "I can calculate your attendance. Tell me like this:\n\
- 'My attendance is **45/60**'\n\
- 'Attended 50 out of 70 classes'";

pub const PLAN_PROMPT: &str = "I can plan the rest of your term. Tell me your attendance so far and how many classes remain, e.g.\n\
- 'I attended **12 of 15**, **20 classes remaining**'\n\
- Add a target such as '**85%**' if you want something other than 80%.";

pub const MARKS_PROMPT: &str = "Tell me your marks and, for a 200-mark subject, the total. For example: 'What grade for **75** marks?' or '**150** out of **200**'.";

pub const CGPA_TO_PERCENT_PROMPT: &str = "Tell me your CGPA and I'll convert it, e.g. 'Convert **8.5** CGPA to percentage'.\n\n\
**Formula:** Percentage = (CGPA - 0.5) x 10";

pub const SGPA_EXPLANATION: &str = "**SGPA (Semester Grade Point Average)**\n\n\
SGPA = sum(credits x grade points) / sum(credits)\n\n\
Grade points: O 10, A 9, B 8, C 7, D 6, E 5, P 4, F 0.\n\n\
Send your subjects like '**4 credits A, 3 credits O, 2 credits B**' and I'll work it out.";

pub const CGPA_EXPLANATION: &str = "**CGPA (Cumulative Grade Point Average)**\n\n\
CGPA = sum(SGPA x semester credits) / sum(semester credits)\n\n\
Classes: 7.50 and above First Class with Distinction, 6.50 First Class, 5.50 Second Class, 4.50 Pass Class.\n\n\
Send your semesters like '**8.5 with 20 credits, 9.1 with 22 credits**' and I'll work it out.";

pub const ATTENDANCE_POLICY: &str = "**Attendance policy:**\n\
- **80% or more**: eligible to appear in end-semester exams\n\
- **75% to below 80%**: scholarship eligibility kept, but not eligible for exams\n\
- **Below 75%**: debarred from exams and not eligible for scholarship";
