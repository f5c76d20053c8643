// Tests for chat transcript bookkeeping: streamed chunks accumulate
// into the in-flight assistant message, which then freezes.

use serenity_companion::remote::chat::{ChatRole, ChatTranscript, CHAT_FALLBACK, CHAT_GREETING};

#[test]
fn test_new_transcript_opens_with_greeting() {
    let transcript = ChatTranscript::new();

    let messages = transcript.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::Assistant);
    assert_eq!(messages[0].text, CHAT_GREETING);
}

#[test]
fn test_streamed_chunks_accumulate_into_reply() {
    let mut transcript = ChatTranscript::new();

    transcript.push_user("I had a rough day.");
    transcript.begin_reply();

    for chunk in ["That sounds", " really hard.", " I'm here."] {
        transcript.append_chunk(chunk);
    }

    assert_eq!(
        transcript.last_reply(),
        Some("That sounds really hard. I'm here.")
    );

    let messages = transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].text, "I had a rough day.");
}

#[test]
fn test_chunks_only_land_on_assistant_messages() {
    let mut transcript = ChatTranscript::new();

    transcript.push_user("hello");
    transcript.append_chunk("stray chunk");

    // The user message is untouched; the greeting is the last reply.
    assert_eq!(transcript.messages()[1].text, "hello");
    assert_eq!(transcript.last_reply(), Some(CHAT_GREETING));
}

#[test]
fn test_fallback_replaces_broken_reply() {
    let mut transcript = ChatTranscript::new();

    transcript.push_user("are you there?");
    transcript.begin_reply();
    transcript.append_chunk("I was about to say");
    transcript.replace_reply(CHAT_FALLBACK);

    assert_eq!(transcript.last_reply(), Some(CHAT_FALLBACK));
    assert_eq!(transcript.messages().len(), 3);
}
