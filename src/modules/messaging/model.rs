pub use schoolhub_models::messaging::{
    Conversation, DEFAULT_MESSAGE_PAGE_SIZE, DirectConversationDto, Message, MessagePage,
    MessagePageMeta, SendMessageDto,
};
