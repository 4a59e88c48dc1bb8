//! Admin compose page: publish form, share toggles, draft list.

use maud::{Markup, PreEscaped, html};

use murmur_types::models::{Draft, Topic};

use super::components::{OpenGraphData, page_shell};

pub struct ComposePage<'a> {
    pub drafts: &'a [Draft],
    pub topics: &'a [Topic],
    pub site_name: &'a str,
    pub base_url: &'a str,
}

pub fn render(p: &ComposePage<'_>) -> Markup {
    let title = format!("Compose \u{2014} {}", p.site_name);
    let canonical = format!("{}/compose", p.base_url);

    let body = html! {
        form class="stack" id="compose-form" onsubmit="publishPost(event)" {
            textarea id="compose-content" placeholder="What's on your mind?" required {}

            select id="compose-topic" {
                option value="" { "no topic" }
                @for topic in p.topics {
                    option value=(topic.id) { (topic.name) }
                }
            }

            div class="share-flags" {
                label { input type="checkbox" id="share-telegram" checked; " Telegram" }
                label { input type="checkbox" id="share-bluesky" checked; " Bluesky" }
                label { input type="checkbox" id="share-email" checked; " Email" }
            }

            div {
                button type="submit" { "Publish" }
                " "
                button type="button" onclick="saveDraft()" { "Save draft" }
            }
            p class="notice" id="compose-status" {}
        }

        div class="drafts" {
            h2 { "Drafts" }
            @if p.drafts.is_empty() {
                p class="notice" { "No drafts." }
            }
            @for draft in p.drafts {
                div class="draft-row" {
                    span { (murmur_types::text::truncate(&draft.content, 60)) }
                    span {
                        button type="button" onclick=(format!("publishDraft({})", draft.id)) { "Publish" }
                        " "
                        button type="button" onclick=(format!("deleteDraft({})", draft.id)) { "Delete" }
                    }
                }
            }
        }

        script { (PreEscaped(COMPOSE_JS)) }
    };

    let og = OpenGraphData {
        title: &title,
        description: "Compose a new post",
        og_type: "website",
    };
    page_shell(&title, og, &canonical, p.site_name, body)
}

const COMPOSE_JS: &str = r#"
function payload(){
 var topic=document.getElementById('compose-topic').value;
 return {content:document.getElementById('compose-content').value,
  topic_id:topic?parseInt(topic,10):null,
  share_telegram:document.getElementById('share-telegram').checked,
  share_bluesky:document.getElementById('share-bluesky').checked,
  share_email:document.getElementById('share-email').checked};}
function post(url,body){
 return fetch(url,{method:'POST',headers:{'Content-Type':'application/json'},
  body:JSON.stringify(body)});}
function status(msg){document.getElementById('compose-status').textContent=msg;}
function publishPost(e){e.preventDefault();
 post('/api/publish',payload()).then(r=>r.json()).then(d=>{
  if(d.error){status(d.error);}else{location.href='/p/'+d.post.id;}});}
function saveDraft(){
 post('/api/drafts',payload()).then(r=>r.json()).then(d=>{
  if(d.error){status(d.error);}else{location.reload();}});}
function publishDraft(id){
 post('/api/publish',{draft_id:id}).then(r=>r.json()).then(d=>{
  if(d.error){status(d.error);}else{location.href='/p/'+d.post.id;}});}
function deleteDraft(id){
 fetch('/api/drafts/'+id,{method:'DELETE'}).then(()=>location.reload());}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn compose_lists_topics_and_drafts() {
        let topics = vec![Topic {
            id: 1,
            name: "Notes".to_string(),
            slug: "notes".to_string(),
            post_count: 0,
            created_at: Utc::now(),
        }];
        let drafts = vec![Draft {
            id: 9,
            content: "work in progress".to_string(),
            topic_id: None,
            share_telegram: true,
            share_bluesky: false,
            share_email: true,
            updated_at: Utc::now(),
        }];

        let html = render(&ComposePage {
            drafts: &drafts,
            topics: &topics,
            site_name: "Murmur",
            base_url: "https://b.example",
        })
        .into_string();

        assert!(html.contains("Notes"));
        assert!(html.contains("work in progress"));
        assert!(html.contains("publishDraft(9)"));
        assert!(html.contains("/api/publish"));
    }
}
