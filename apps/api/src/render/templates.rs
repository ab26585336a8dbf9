//! Built-in template sources.
//!
//! Regions are declared with `{{?list}}` (heading shown once when the list has
//! items) wrapping `{{#list}}` (body repeated per item). See `engine` for the
//! tag syntax.

/// Single-column Typst layout.
pub const CLASSIC: &str = r##"#set document(title: "{{@name}}")
#set page(paper: "a4", margin: (x: 1.8cm, y: 1.5cm))
#set text(size: 10.5pt)
#set par(justify: true)

#let section(title) = [
  #v(6pt)
  #text(size: 12pt, weight: "bold")[#upper(title)]
  #v(-6pt)
  #line(length: 100%, stroke: 0.5pt)
]

#align(center)[
  #text(size: 20pt, weight: "bold")[{{name}}] \
  {{?headline}}
  #text(size: 12pt)[{{headline}}] \
  {{/headline}}
  {{address}} | {{phone}} | #link("mailto:{{@email}}")[{{email}}]
  {{#links}}
  | #link("{{@.}}")[{{.}}]
  {{/links}}
]

{{?summary}}
#section("Summary")
{{summary}}

{{/summary}}
{{?experience}}
#section("Experience")
{{#experience}}
*{{title}}*{{?organization}}, {{organization}}{{/organization}} #h(1fr) {{dates}} \
{{?location}}
_{{location}}_ \
{{/location}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/experience}}
{{/experience}}
{{?education}}
#section("Education")
{{#education}}
*{{degree}}*{{?institution}}, {{institution}}{{/institution}} #h(1fr) {{dates}} \
{{?location}}
_{{location}}_ \
{{/location}}
{{#details}}
- {{.}}
{{/details}}

{{/education}}
{{/education}}
{{?skills}}
#section("Skills")
{{#skills}}
*{{group}}:* {{joined}} \
{{/skills}}

{{/skills}}
{{?projects}}
#section("Projects")
{{#projects}}
*{{name}}*{{?link}} #h(1fr) #link("{{@link}}")[{{link}}]{{/link}} \
{{?description}}
{{description}} \
{{/description}}
{{?technologies}}
_{{technologies}}_ \
{{/technologies}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/projects}}
{{/projects}}
{{?certifications}}
#section("Certifications")
{{#certifications}}
- {{.}}
{{/certifications}}

{{/certifications}}
{{?languages}}
#section("Languages")
{{#languages}}
- {{name}}{{?proficiency}} ({{proficiency}}){{/proficiency}}
{{/languages}}
{{/languages}}
"##;

/// Typst layout with a two-column header and accent colour.
pub const MODERN: &str = r##"#let accent = rgb("#1f4e79")
#set document(title: "{{@name}}")
#set page(paper: "a4", margin: (x: 1.6cm, y: 1.4cm))
#set text(size: 10pt)
#show heading.where(level: 2): it => block(above: 12pt, below: 6pt)[
  #text(fill: accent, weight: "bold")[#it.body]
  #v(-4pt)
  #line(length: 100%, stroke: 1pt + accent)
]

#grid(
  columns: (1fr, auto),
  gutter: 12pt,
  [
    #text(size: 24pt, weight: "bold", fill: accent)[{{name}}] \
    {{?headline}}
    #text(size: 12pt)[{{headline}}]
    {{/headline}}
  ],
  align(right)[
    #link("mailto:{{@email}}")[{{email}}] \
    {{phone}} \
    {{address}}
    {{#links}}
    \ #link("{{@.}}")[{{.}}]
    {{/links}}
  ],
)

{{?summary}}
== Summary
{{summary}}

{{/summary}}
{{?experience}}
== Experience
{{#experience}}
#grid(
  columns: (1fr, auto),
  [*{{title}}* #h(4pt) {{organization}}],
  align(right)[#text(fill: gray)[{{dates}}]],
)
{{?location}}
#text(fill: gray)[{{location}}]
{{/location}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/experience}}
{{/experience}}
{{?education}}
== Education
{{#education}}
#grid(
  columns: (1fr, auto),
  [*{{degree}}* #h(4pt) {{institution}}],
  align(right)[#text(fill: gray)[{{dates}}]],
)
{{#details}}
- {{.}}
{{/details}}

{{/education}}
{{/education}}
{{?skills}}
== Skills
{{#skills}}
*{{group}}:* {{joined}} \
{{/skills}}

{{/skills}}
{{?projects}}
== Projects
{{#projects}}
*{{name}}*{{?technologies}} #h(4pt) #text(fill: gray)[{{technologies}}]{{/technologies}} \
{{?description}}
{{description}} \
{{/description}}
{{?link}}
#link("{{@link}}")[{{link}}] \
{{/link}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/projects}}
{{/projects}}
{{?certifications}}
== Certifications
{{#certifications}}
- {{.}}
{{/certifications}}

{{/certifications}}
{{?languages}}
== Languages
{{#languages}}
{{name}}{{?proficiency}} ({{proficiency}}){{/proficiency}} #h(12pt)
{{/languages}}
{{/languages}}
"##;

/// Typst layout with section icons and skill chips.
pub const BRILLIANT: &str = r##"#let accent = rgb("#b5179e")
#set document(title: "{{@name}}")
#set page(paper: "a4", margin: (x: 1.5cm, y: 1.3cm))
#set text(size: 10pt)

#let section(icon, title) = [
  #v(8pt)
  #text(fill: accent, size: 13pt)[#icon #h(4pt) *#title*]
  #v(-5pt)
  #line(length: 100%, stroke: 0.8pt + accent)
]
#let chip(body) = box(fill: accent.lighten(85%), inset: (x: 5pt, y: 3pt), radius: 4pt)[#body]

#align(center)[
  #text(size: 26pt, weight: "bold")[{{name}}]
  {{?headline}}
  \ #text(size: 12pt, fill: accent)[{{headline}}]
  {{/headline}}
  \ {{address}} #h(6pt) · #h(6pt) {{phone}} #h(6pt) · #h(6pt) #link("mailto:{{@email}}")[{{email}}]
  {{#links}}
  #h(6pt) · #h(6pt) #link("{{@.}}")[{{.}}]
  {{/links}}
]

{{?summary}}
#section("✦", "Profile")
{{summary}}

{{/summary}}
{{?experience}}
#section("◆", "Experience")
{{#experience}}
*{{title}}* #h(1fr) {{dates}} \
#text(fill: accent)[{{organization}}]{{?location}} #h(1fr) _{{location}}_{{/location}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/experience}}
{{/experience}}
{{?education}}
#section("▲", "Education")
{{#education}}
*{{degree}}* #h(1fr) {{dates}} \
#text(fill: accent)[{{institution}}]{{?location}} #h(1fr) _{{location}}_{{/location}}
{{#details}}
- {{.}}
{{/details}}

{{/education}}
{{/education}}
{{?skills}}
#section("●", "Skills")
{{#skills}}
*{{group}}* \
{{#items}}
#chip[{{.}}]
{{/items}}

{{/skills}}
{{/skills}}
{{?projects}}
#section("■", "Projects")
{{#projects}}
*{{name}}*{{?link}} #h(1fr) #link("{{@link}}")[{{link}}]{{/link}} \
{{?description}}
{{description}} \
{{/description}}
{{?technologies}}
#text(fill: accent)[{{technologies}}] \
{{/technologies}}
{{#bullets}}
- {{.}}
{{/bullets}}

{{/projects}}
{{/projects}}
{{?certifications}}
#section("★", "Certifications")
{{#certifications}}
#chip[{{.}}]
{{/certifications}}

{{/certifications}}
{{?languages}}
#section("◎", "Languages")
{{#languages}}
#chip[{{name}}{{?proficiency}} · {{proficiency}}{{/proficiency}}]
{{/languages}}
{{/languages}}
"##;

/// Standalone HTML document.
pub const HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{name}}</title>
<style>
  body { font-family: "Helvetica Neue", Arial, sans-serif; max-width: 800px; margin: 2em auto; color: #222; line-height: 1.45; }
  header { text-align: center; margin-bottom: 1.5em; }
  header h1 { margin: 0; font-size: 2em; }
  header .headline { color: #1f4e79; margin: 0.2em 0; }
  header .contact { color: #555; }
  h2 { border-bottom: 1px solid #1f4e79; color: #1f4e79; font-size: 1.1em; text-transform: uppercase; }
  .entry { margin-bottom: 1em; }
  .entry .meta { display: flex; justify-content: space-between; }
  .entry .dates, .entry .location { color: #666; }
</style>
</head>
<body>
<header>
  <h1>{{name}}</h1>
  {{?headline}}
  <p class="headline">{{headline}}</p>
  {{/headline}}
  <p class="contact">{{address}} · {{phone}} · <a href="mailto:{{@email}}">{{email}}</a>
  {{#links}}
    · <a href="{{@.}}">{{.}}</a>
  {{/links}}
  </p>
</header>
{{?summary}}
<section>
  <h2>Summary</h2>
  <p>{{summary}}</p>
</section>
{{/summary}}
{{?experience}}
<section>
  <h2>Experience</h2>
  {{#experience}}
  <div class="entry">
    <div class="meta"><strong>{{title}}</strong><span class="dates">{{dates}}</span></div>
    <div>{{organization}}{{?location}} <span class="location">· {{location}}</span>{{/location}}</div>
    {{?bullets}}
    <ul>
      {{#bullets}}
      <li>{{.}}</li>
      {{/bullets}}
    </ul>
    {{/bullets}}
  </div>
  {{/experience}}
</section>
{{/experience}}
{{?education}}
<section>
  <h2>Education</h2>
  {{#education}}
  <div class="entry">
    <div class="meta"><strong>{{degree}}</strong><span class="dates">{{dates}}</span></div>
    <div>{{institution}}{{?location}} <span class="location">· {{location}}</span>{{/location}}</div>
    {{?details}}
    <ul>
      {{#details}}
      <li>{{.}}</li>
      {{/details}}
    </ul>
    {{/details}}
  </div>
  {{/education}}
</section>
{{/education}}
{{?skills}}
<section>
  <h2>Skills</h2>
  {{#skills}}
  <p><strong>{{group}}:</strong> {{joined}}</p>
  {{/skills}}
</section>
{{/skills}}
{{?projects}}
<section>
  <h2>Projects</h2>
  {{#projects}}
  <div class="entry">
    <div class="meta"><strong>{{name}}</strong>{{?link}}<a href="{{@link}}">{{link}}</a>{{/link}}</div>
    {{?description}}
    <p>{{description}}</p>
    {{/description}}
    {{?technologies}}
    <p class="location">{{technologies}}</p>
    {{/technologies}}
    {{?bullets}}
    <ul>
      {{#bullets}}
      <li>{{.}}</li>
      {{/bullets}}
    </ul>
    {{/bullets}}
  </div>
  {{/projects}}
</section>
{{/projects}}
{{?certifications}}
<section>
  <h2>Certifications</h2>
  <ul>
    {{#certifications}}
    <li>{{.}}</li>
    {{/certifications}}
  </ul>
</section>
{{/certifications}}
{{?languages}}
<section>
  <h2>Languages</h2>
  <ul>
    {{#languages}}
    <li>{{name}}{{?proficiency}} ({{proficiency}}){{/proficiency}}</li>
    {{/languages}}
  </ul>
</section>
{{/languages}}
</body>
</html>
"##;

pub const MARKDOWN: &str = r##"# {{name}}
{{?headline}}

**{{headline}}**
{{/headline}}

{{address}} · {{phone}} · [{{email}}](<mailto:{{@email}}>)
{{#links}}
· [{{.}}](<{{@.}}>)
{{/links}}
{{?summary}}

## Summary

{{summary}}
{{/summary}}
{{?experience}}

## Experience
{{#experience}}

### {{title}}{{?organization}}, {{organization}}{{/organization}}
_{{dates}}_{{?location}} · {{location}}{{/location}}

{{#bullets}}
- {{.}}
{{/bullets}}
{{/experience}}
{{/experience}}
{{?education}}

## Education
{{#education}}

### {{degree}}{{?institution}}, {{institution}}{{/institution}}
_{{dates}}_{{?location}} · {{location}}{{/location}}

{{#details}}
- {{.}}
{{/details}}
{{/education}}
{{/education}}
{{?skills}}

## Skills

{{#skills}}
- **{{group}}:** {{joined}}
{{/skills}}
{{/skills}}
{{?projects}}

## Projects
{{#projects}}

### {{name}}
{{?link}}
[{{link}}](<{{@link}}>)
{{/link}}
{{?description}}

{{description}}
{{/description}}
{{?technologies}}

_{{technologies}}_
{{/technologies}}

{{#bullets}}
- {{.}}
{{/bullets}}
{{/projects}}
{{/projects}}
{{?certifications}}

## Certifications

{{#certifications}}
- {{.}}
{{/certifications}}
{{/certifications}}
{{?languages}}

## Languages

{{#languages}}
- {{name}}{{?proficiency}} ({{proficiency}}){{/proficiency}}
{{/languages}}
{{/languages}}
"##;
