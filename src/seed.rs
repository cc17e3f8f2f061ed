use crate::error::Result;
use crate::session::store::SessionStore;
use crate::session::{Message, Session};
use chrono::{DateTime, Duration, Utc};

struct Reply {
    model_id: &'static str,
    content: &'static str,
}

struct Example {
    id: &'static str,
    title: &'static str,
    days_ago: i64,
    first_message_id: usize,
    prompt: &'static str,
    replies: &'static [Reply],
}

const EXAMPLES: &[Example] = &[
    Example {
        id: "example-1",
        title: "What is machine learning?",
        days_ago: 1,
        first_message_id: 1,
        prompt: "What is machine learning?",
        replies: &[
            Reply {
                model_id: "chatgpt",
                content: "Machine learning is a subset of artificial intelligence that enables computers to learn and make decisions from data without being explicitly programmed for every task. It uses algorithms to identify patterns in data and make predictions or decisions based on those patterns.",
            },
            Reply {
                model_id: "claude",
                content: "Machine learning is a method of data analysis that automates analytical model building. It's based on the idea that systems can learn from data, identify patterns and make decisions with minimal human intervention. Think of it as teaching computers to recognize patterns the way humans do, but at scale.",
            },
            Reply {
                model_id: "deepseek",
                content: "Machine learning is a branch of AI that focuses on building systems that learn from data. Instead of programming explicit rules, we feed algorithms large amounts of data so they can automatically find patterns and make predictions. It's like giving a computer the ability to improve its performance on a task through experience.",
            },
        ],
    },
    Example {
        id: "example-2",
        title: "Best programming languages...",
        days_ago: 2,
        first_message_id: 5,
        prompt: "What are the best programming languages to learn in 2024?",
        replies: &[
            Reply {
                model_id: "chatgpt",
                content: "For 2024, I'd recommend: 1) Python - excellent for AI/ML, data science, and web development, 2) JavaScript/TypeScript - essential for web development, 3) Rust - growing rapidly for systems programming, 4) Go - great for backend services, and 5) Swift/Kotlin for mobile development.",
            },
            Reply {
                model_id: "claude",
                content: "The top languages for 2024 depend on your goals: Python remains king for AI/data science, JavaScript is still essential for web development, TypeScript adds type safety, Rust offers memory safety for systems programming, and Go provides simplicity for cloud services. Consider your career path when choosing!",
            },
        ],
    },
];

fn build(example: &Example, now: DateTime<Utc>) -> Session {
    let created_at = now - Duration::days(example.days_ago);
    let mut session = Session::new(example.id, created_at);
    session.title = example.title.to_string();

    session.messages.push(Message::user(
        format!("msg-{}", example.first_message_id),
        example.prompt,
        created_at,
    ));
    for (offset, reply) in (1..).zip(example.replies) {
        session.messages.push(Message::assistant(
            format!("msg-{}", example.first_message_id + offset),
            reply.model_id,
            reply.content,
            created_at + Duration::seconds(offset as i64),
        ));
    }
    session
}

/// Loads the demo conversations and opens the most recent one.
pub fn seed_examples(store: &mut SessionStore, now: DateTime<Utc>) -> Result<()> {
    for example in EXAMPLES {
        store.insert_seeded(build(example, now));
    }
    match EXAMPLES.first() {
        Some(first) => store.select_session(first.id),
        None => Ok(()),
    }
}
